use crate::types::AccessToken;
use http_client::Request;

/// User agent sent with every request
const USER_AGENT: &str = concat!("vibesync/", env!("CARGO_PKG_VERSION"));

/// Add headers shared by all provider requests
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept", "application/json");
    let _ = request.insert_header("Accept-Language", "en-US,en;q=0.9");
}

/// Add the bearer credential to a request
pub fn add_bearer_auth(request: &mut Request, token: &AccessToken) {
    let _ = request.insert_header("Authorization", token.bearer_header());
}

/// Add headers for an authenticated JSON GET
pub fn add_api_headers(request: &mut Request, token: &AccessToken) {
    add_common_headers(request);
    add_bearer_auth(request, token);
}
