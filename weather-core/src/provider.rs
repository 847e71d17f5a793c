use crate::{Config, WeatherSnapshot, error::ProviderError, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// Source of current conditions for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, ProviderError>;
}

/// Construct the WeatherAPI.com provider from config.
///
/// The key must come from configuration; there is no built-in fallback.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
                 Hint: run `weather configure` or set WEATHERAPI_KEY."
        )
    })?;

    let provider = WeatherApiProvider::new(api_key.to_owned(), config.lookup_timeout())?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("WEATHERAPI_KEY"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
