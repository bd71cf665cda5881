//! Weekend-planning tools: canned weather, canned activities, and today's date.

use async_trait::async_trait;
use pipeline::{Tool, ToolError, ToolName};
use serde_json::{json, Value};
use tracing::info;

use super::{builtin_name, string_arg, thread_rng_sampler, Sampler};

/// Chance that `get_weather` reports sunshine.
pub const SUNNY_PROBABILITY: f64 = 0.05;

/// Returns `{temperature, description}` for a city: usually 60° and rainy,
/// occasionally 72° and sunny.
pub struct GetWeather {
    name: ToolName,
    takes_date: bool,
    sampler: Sampler,
}

impl GetWeather {
    /// Weather for a city, today.
    pub fn new() -> Self {
        Self {
            name: builtin_name("get_weather"),
            takes_date: false,
            sampler: thread_rng_sampler(),
        }
    }

    /// Weather for a city on a given `YYYY-MM-DD` date.
    pub fn with_date() -> Self {
        Self {
            takes_date: true,
            ..Self::new()
        }
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }
}

impl Default for GetWeather {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetWeather {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> &str {
        if self.takes_date {
            "Returns weather data for a given city and date."
        } else {
            "Returns weather data for a given city, a dictionary with temperature and description."
        }
    }

    fn parameters(&self) -> Value {
        if self.takes_date {
            json!({
                "type": "object",
                "properties": {
                    "city": { "type": "string", "description": "The city to get the weather for." },
                    "date": { "type": "string", "description": "The date to get weather for in format YYYY-MM-DD." }
                },
                "required": ["city", "date"]
            })
        } else {
            json!({
                "type": "object",
                "properties": {
                    "city": { "type": "string", "description": "The city to get the weather for." }
                },
                "required": ["city"]
            })
        }
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let city = string_arg(&self.name, &arguments, "city")?;
        if self.takes_date {
            let date = string_arg(&self.name, &arguments, "date")?;
            info!(%city, %date, "getting weather");
        } else {
            info!(%city, "getting weather");
        }

        if (self.sampler)() < SUNNY_PROBABILITY {
            Ok(json!({ "temperature": 72, "description": "Sunny" }))
        } else {
            Ok(json!({ "temperature": 60, "description": "Rainy" }))
        }
    }
}

/// Lists the same three activities for any city and date.
pub struct GetActivities {
    name: ToolName,
}

impl GetActivities {
    pub fn new() -> Self {
        Self {
            name: builtin_name("get_activities"),
        }
    }
}

impl Default for GetActivities {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetActivities {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns a list of activities for a given city and date."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": { "type": "string", "description": "The city to get activities for." },
                "date": { "type": "string", "description": "The date to get activities for in format YYYY-MM-DD." }
            },
            "required": ["city", "date"]
        })
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let city = string_arg(&self.name, &arguments, "city")?;
        let date = string_arg(&self.name, &arguments, "date")?;
        info!(%city, %date, "getting activities");
        Ok(json!([
            { "name": "Hiking", "location": city },
            { "name": "Beach", "location": city },
            { "name": "Museum", "location": city }
        ]))
    }
}

/// Today's local date as `YYYY-MM-DD`.
pub struct GetCurrentDate {
    name: ToolName,
}

impl GetCurrentDate {
    pub fn new() -> Self {
        Self {
            name: builtin_name("get_current_date"),
        }
    }
}

impl Default for GetCurrentDate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetCurrentDate {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> &str {
        "Gets the current date from the system and returns as a string in format YYYY-MM-DD."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
        info!("getting current date");
        Ok(Value::String(
            chrono::Local::now().format("%Y-%m-%d").to_string(),
        ))
    }
}
