use crate::config::{CLIENT_NAME, CLIENT_VERSION};
use const_format::concatcp;
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = concatcp!(CLIENT_NAME, "/", CLIENT_VERSION);

pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
