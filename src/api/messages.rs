pub fn message_endpoint(id: &str) -> String {
    format!("/gmail/v1/users/me/messages/{id}")
}

pub fn list_endpoint() -> &'static str {
    "/gmail/v1/users/me/messages"
}

pub fn modify_endpoint(id: &str) -> String {
    format!("/gmail/v1/users/me/messages/{id}/modify")
}

pub fn detail_query() -> Vec<(String, String)> {
    let mut query = vec![("format".to_string(), "metadata".to_string())];
    for header in ["Subject", "From"] {
        query.push(("metadataHeaders".to_string(), header.to_string()));
    }
    query
}

pub fn unread_query(max_results: u32, since_days: u32) -> Vec<(String, String)> {
    vec![
        (
            "q".to_string(),
            format!("is:unread newer_than:{since_days}d"),
        ),
        ("maxResults".to_string(), max_results.to_string()),
    ]
}
