use std::io::Write;

use serde::Serialize;

use crate::error::AppResult;

pub fn print<T: Serialize>(value: &T) -> AppResult<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub fn write_line<W: Write, T: Serialize>(writer: &mut W, value: &T) -> AppResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_value() {
        let mut buffer = Vec::new();
        write_line(&mut buffer, &serde_json::json!({"ok": true})).expect("write");
        write_line(&mut buffer, &serde_json::json!({"ok": false})).expect("write");
        assert_eq!(
            String::from_utf8(buffer).expect("utf8"),
            "{\"ok\":true}\n{\"ok\":false}\n"
        );
    }
}
