use anyhow::{bail, Result};
use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use embedded_svc::io::Write;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::info;

const TIMEOUT_MS: u64 = 15_000;
const MAX_BODY: usize = 32 * 1024;

fn connect() -> Result<Client<EspHttpConnection>> {
    let config = Configuration {
        timeout: Some(std::time::Duration::from_millis(TIMEOUT_MS)),
        use_global_ca_store: true,
        crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
        ..Default::default()
    };
    Ok(Client::wrap(EspHttpConnection::new(&config)?))
}

fn short(url: &str) -> String {
    // Keep API keys in query strings out of the log.
    url.split('?').next().unwrap_or(url).chars().take(80).collect()
}

/// HTTPS GET returning the body as a String.
pub fn https_get(url: &str) -> Result<String> {
    let mut client = connect()?;
    let mut response = client.request(Method::Get, url, &[])?.submit()?;

    let status = response.status();
    info!("HTTP GET {} -> status {}", short(url), status);
    if status == 429 {
        bail!("API rate limited (HTTP 429)");
    }
    if status != 200 {
        bail!("HTTP error: status {}", status);
    }

    let mut body: Vec<u8> = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = response.read(&mut buf)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
        if body.len() > MAX_BODY {
            bail!("Response too large (>32KB)");
        }
    }

    Ok(String::from_utf8(body)?)
}

/// HTTPS POST of a JSON body. Only the status is checked.
pub fn https_post_json(url: &str, headers: &[(&str, &str)], body: &str) -> Result<()> {
    let mut client = connect()?;
    let content_length = body.len().to_string();
    let mut all_headers = vec![
        ("Content-Type", "application/json"),
        ("Content-Length", content_length.as_str()),
    ];
    all_headers.extend_from_slice(headers);

    let mut request = client.request(Method::Post, url, &all_headers)?;
    request.write_all(body.as_bytes())?;
    request.flush()?;
    let response = request.submit()?;

    let status = response.status();
    if !(200..300).contains(&status) {
        bail!("HTTP error: status {}", status);
    }
    Ok(())
}
