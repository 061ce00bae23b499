use super::*;

/// Minimal JSON-RPC client for the node. Every call opens its own
/// connection and asks the node to close it afterwards.
#[derive(Debug, Clone)]
pub struct Rpc {
    client: reqwest::Client,
    url: String,
    authorization: String,
}

impl Rpc {
    pub fn new(config: &SoloConfig) -> Result<Self, SoloError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .user_agent(USER_AGENT)
            .build()
            .context(error::HttpSnafu)?;

        Ok(Self {
            client,
            url: config.url(),
            authorization: Self::authorization(&config.username, &config.password),
        })
    }

    pub fn authorization(username: &str, password: &str) -> String {
        format!(
            "Basic {}",
            codec::base64_encode(format!("{username}:{password}").as_bytes())
        )
    }

    /// Returns the `result` member, which may be `null`.
    pub async fn call(&self, id: u64, method: &str, params: Value) -> Result<Value, SoloError> {
        debug!("RPC {method} -> {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONNECTION, "close")
            .json(&json!({
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await
            .context(error::HttpSnafu)?
            .json::<Value>()
            .await
            .context(error::HttpSnafu)?;

        Self::result(response)
    }

    fn result(mut response: Value) -> Result<Value, SoloError> {
        if let Some(error) = response.get("error").filter(|error| !error.is_null()) {
            return Err(SoloError::JsonRpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string()),
            });
        }

        response
            .get_mut("result")
            .map(Value::take)
            .ok_or(SoloError::MissingResult)
    }
}
