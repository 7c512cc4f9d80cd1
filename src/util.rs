use sysinfo::System;

const HUB_PORT: &str = "PORT";

const DEFAULT_PORT: u16 = 3001;

pub fn get_port() -> u16 {
    let port_from_env = std::env::var(HUB_PORT);
    port_from_env.map_or(DEFAULT_PORT, |res| res.parse().unwrap_or(DEFAULT_PORT))
}

const API_KEY: &str = "API_KEY";

pub fn get_api_key() -> Option<String> {
    let key_from_env = std::env::var(API_KEY);
    key_from_env.ok().filter(|key| !key.is_empty())
}

const SERVER_URL: &str = "SERVER_URL";

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3001";

pub fn get_server_url() -> String {
    let url_from_env = std::env::var(SERVER_URL);
    // A trailing slash would double up when the push path is appended
    url_from_env.map_or(String::from(DEFAULT_SERVER_URL), |url| {
        url.trim_end_matches('/').to_string()
    })
}

const SERVER_NAME: &str = "SERVER_NAME";

pub fn get_server_name() -> String {
    let name_from_env = std::env::var(SERVER_NAME);
    name_from_env
        .ok()
        .filter(|name| !name.is_empty())
        .or_else(System::host_name)
        .unwrap_or_else(|| String::from("unknown"))
}

const INTERVAL: &str = "INTERVAL";

const DEFAULT_INTERVAL_SECS: u64 = 300;

pub fn get_interval_secs() -> u64 {
    let interval_from_env = std::env::var(INTERVAL);
    interval_from_env.map_or(DEFAULT_INTERVAL_SECS, |res| {
        res.parse().unwrap_or(DEFAULT_INTERVAL_SECS)
    })
}
