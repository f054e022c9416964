use crate::data::Weather;
use crate::errors::PredictResult;

/// Weather lookup for outdoor games.
///
/// With an OpenWeatherMap key configured this fetches live conditions; any
/// failure (or no key) degrades to the fixed clear-sky mock. The pipeline
/// never sees an error from this provider, only `Weather` or nothing upstream.
pub struct WeatherProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    pub async fn get_weather_for_game(&self, city: &str, state: Option<&str>) -> Weather {
        let location = match state {
            Some(s) => format!("{city}, {s}"),
            None => city.to_string(),
        };

        let key = match &self.api_key {
            Some(k) => k.clone(),
            None => return mock_weather(&location),
        };

        match self.fetch_current(city, state, &key).await {
            Ok(weather) => weather,
            Err(e) => {
                tracing::warn!(city = %city, error = %e, "weather fetch failed, using mock");
                mock_weather(&location)
            }
        }
    }

    async fn fetch_current(
        &self,
        city: &str,
        state: Option<&str>,
        key: &str,
    ) -> PredictResult<Weather> {
        let query = match state {
            Some(s) => format!("{city},{s},US"),
            None => format!("{city},US"),
        };
        let url = format!("{}/weather", self.base_url);

        let body: serde_json::Value = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("appid", key), ("units", "imperial")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let rain = body["rain"]["1h"].as_f64().unwrap_or(0.0);
        let snow = body["snow"]["1h"].as_f64().unwrap_or(0.0);

        Ok(Weather {
            temp: body["main"]["temp"].as_f64().unwrap_or(70.0),
            wind_speed: body["wind"]["speed"].as_f64().unwrap_or(0.0),
            precipitation: if rain > 0.0 { rain } else { snow },
            conditions: body["weather"][0]["main"]
                .as_str()
                .unwrap_or("clear")
                .to_ascii_lowercase(),
            humidity: body["main"]["humidity"].as_f64().unwrap_or(65.0),
            location: match state {
                Some(s) => format!("{city}, {s}"),
                None => city.to_string(),
            },
        })
    }
}

fn mock_weather(location: &str) -> Weather {
    Weather {
        temp: 72.0,
        wind_speed: 8.0,
        precipitation: 0.0,
        conditions: "clear".to_string(),
        humidity: 65.0,
        location: location.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_key_serves_mock() {
        let provider = WeatherProvider::new(None, "http://unused.invalid".to_string());
        let weather = provider.get_weather_for_game("Kansas City", None).await;
        assert_eq!(weather.temp, 72.0);
        assert_eq!(weather.precipitation, 0.0);
        assert_eq!(weather.conditions, "clear");
        assert_eq!(weather.location, "Kansas City");
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_mock() {
        // Unroutable base URL: the fetch errors and we must still get weather.
        let provider = WeatherProvider::new(
            Some("key".to_string()),
            "http://127.0.0.1:1/nope".to_string(),
        );
        let weather = provider.get_weather_for_game("Buffalo", Some("NY")).await;
        assert_eq!(weather.temp, 72.0, "failure path must serve the mock");
        assert_eq!(weather.location, "Buffalo, NY");
    }
}
