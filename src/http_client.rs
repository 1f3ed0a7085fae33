use std::time::Duration;

pub fn new_http_client() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(5)))
        .timeout_recv_response(Some(Duration::from_secs(30)))
        .timeout_send_body(Some(Duration::from_secs(30)))
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION"),
            " (",
            env!("CARGO_PKG_REPOSITORY"),
            ")",
        ))
        .https_only(true)
        // Error bodies from the Disco API carry a message we want to read.
        .http_status_as_error(false)
        .build();
    ureq::Agent::new_with_config(config)
}
