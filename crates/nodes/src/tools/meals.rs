//! Meal-planning tools.

use async_trait::async_trait;
use pipeline::{Tool, ToolError, ToolName};
use serde_json::{json, Value};
use tracing::info;

use super::{builtin_name, string_arg, thread_rng_sampler, Sampler};

/// Looks up a canned recipe matching the query.
pub struct FindRecipes {
    name: ToolName,
}

impl FindRecipes {
    pub fn new() -> Self {
        Self {
            name: builtin_name("find_recipes"),
        }
    }
}

impl Default for FindRecipes {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FindRecipes {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns recipes (JSON) based on a query."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "User query or desired meal/ingredient" }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let query = string_arg(&self.name, &arguments, "query")?;
        info!(%query, "finding recipes");
        let query = query.to_lowercase();

        let recipe = if query.contains("pasta") {
            json!({
                "title": "Pasta Primavera",
                "ingredients": ["pasta", "vegetables", "olive oil"],
                "steps": ["Cook pasta.", "Sauté vegetables."]
            })
        } else if query.contains("tofu") {
            json!({
                "title": "Tofu Stir Fry",
                "ingredients": ["tofu", "soy sauce", "vegetables"],
                "steps": ["Cube tofu.", "Stir fry veggies."]
            })
        } else {
            json!({
                "title": "Grilled Cheese Sandwich",
                "ingredients": ["bread", "cheese", "butter"],
                "steps": ["Butter bread.", "Place cheese between slices.", "Grill until golden brown."]
            })
        };
        Ok(Value::Array(vec![recipe]))
    }
}

/// Reports the fridge contents: a pasta pantry or a tofu pantry, even odds.
pub struct CheckFridge {
    name: ToolName,
    sampler: Sampler,
}

impl CheckFridge {
    pub fn new() -> Self {
        Self {
            name: builtin_name("check_fridge"),
            sampler: thread_rng_sampler(),
        }
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }
}

impl Default for CheckFridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CheckFridge {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> &str {
        "Returns a JSON list of ingredients currently in the fridge."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
        info!("checking fridge for current ingredients");
        if (self.sampler)() < 0.5 {
            Ok(json!(["pasta", "tomato sauce", "bell peppers", "olive oil"]))
        } else {
            Ok(json!(["tofu", "soy sauce", "broccoli", "carrots"]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn recipe_title(query: &str) -> String {
        let out = FindRecipes::new()
            .call(json!({ "query": query }))
            .await
            .unwrap();
        out[0]["title"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn recipes_follow_the_main_ingredient() {
        assert_eq!(recipe_title("Something with PASTA please").await, "Pasta Primavera");
        assert_eq!(recipe_title("tofu dinner").await, "Tofu Stir Fry");
        assert_eq!(recipe_title("quick lunch").await, "Grilled Cheese Sandwich");
    }

    #[tokio::test]
    async fn fridge_contents_depend_on_the_sample() {
        let low = CheckFridge::new().with_sampler(Arc::new(|| 0.2));
        assert_eq!(low.call(json!({})).await.unwrap()[0], "pasta");

        let high = CheckFridge::new().with_sampler(Arc::new(|| 0.7));
        assert_eq!(high.call(json!({})).await.unwrap()[0], "tofu");
    }
}
