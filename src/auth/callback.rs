use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use url::Url;

use crate::error::{AppError, AppResult};

pub async fn capture_code(
    redirect_uri: &str,
    expected_state: &str,
    timeout: Duration,
) -> AppResult<String> {
    let redirect = Url::parse(redirect_uri)?;
    if redirect.scheme() != "http" {
        return Err(AppError::Config(
            "redirect_uri must use http for local callback capture".to_string(),
        ));
    }

    let host = redirect
        .host_str()
        .ok_or_else(|| AppError::Config("redirect_uri is missing host".to_string()))?;
    let port = redirect
        .port_or_known_default()
        .ok_or_else(|| AppError::Config("redirect_uri is missing port".to_string()))?;
    let expected_path = redirect.path().to_string();

    let listener = TcpListener::bind((host, port)).await.map_err(|err| {
        AppError::Auth(format!(
            "failed to bind oauth callback listener on {host}:{port}: {err}"
        ))
    })?;
    tracing::debug!(%host, port, "waiting for oauth callback");

    time::timeout(timeout, async {
        let (mut stream, _) = listener.accept().await?;
        answer_callback(&mut stream, &expected_path, expected_state).await
    })
    .await
    .map_err(|_| AppError::Auth("timed out waiting for oauth callback".to_string()))?
}

async fn answer_callback(
    stream: &mut TcpStream,
    expected_path: &str,
    expected_state: &str,
) -> AppResult<String> {
    let mut buf = vec![0_u8; 8192];
    let size = stream.read(&mut buf).await?;
    if size == 0 {
        return Err(AppError::Auth("empty oauth callback request".to_string()));
    }

    let request = String::from_utf8_lossy(&buf[..size]);
    let request_line = request
        .lines()
        .next()
        .ok_or_else(|| AppError::Auth("malformed oauth callback request".to_string()))?;

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();

    if method != "GET" {
        reply(
            stream,
            "405 Method Not Allowed",
            "oauth callback only accepts GET requests",
        )
        .await?;
        return Err(AppError::Auth(
            "oauth callback received non-GET request".to_string(),
        ));
    }

    match parse_callback(target, expected_path, expected_state) {
        Ok(code) => {
            reply(
                stream,
                "200 OK",
                "email-radar is connected to gmail. you can close this tab.",
            )
            .await?;
            Ok(code)
        }
        Err(err) => {
            let _ = reply(stream, "400 Bad Request", &format!("login failed: {err}")).await;
            Err(err)
        }
    }
}

pub(crate) fn parse_callback(
    target: &str,
    expected_path: &str,
    expected_state: &str,
) -> AppResult<String> {
    let callback_url = Url::parse(&format!("http://localhost{target}"))?;
    if callback_url.path() != expected_path {
        return Err(AppError::Auth(format!(
            "oauth callback path mismatch: expected {expected_path}, got {}",
            callback_url.path()
        )));
    }

    let param = |name: &str| {
        callback_url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if let Some(error) = param("error") {
        let description = param("error_description").unwrap_or_else(|| "no description".to_string());
        return Err(AppError::Auth(format!(
            "oauth authorization failed: {error} ({description})"
        )));
    }

    let state = param("state")
        .ok_or_else(|| AppError::Auth("oauth callback missing state parameter".to_string()))?;
    if state != expected_state {
        return Err(AppError::Auth(
            "oauth state mismatch; aborting login".to_string(),
        ));
    }

    param("code").ok_or_else(|| AppError::Auth("oauth callback missing code parameter".to_string()))
}

async fn reply(stream: &mut TcpStream, status: &str, message: &str) -> AppResult<()> {
    let body = format!(
        "<!doctype html><html><body><p>{}</p></body></html>",
        html_escape::encode_text(message)
    );

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
