use std::sync::LazyLock;

use hbnb_core::{BaseModel, Column, Context, FieldDecl, Model, ModelResult, ModelSchema};
use serde_json::Value;

pub const NAME_FIELD: &str = "name";
pub const NAME_MAX_LENGTH: usize = 128;

static SCHEMA: LazyLock<ModelSchema> = LazyLock::new(|| {
    ModelSchema::new("State").table("states").field(
        FieldDecl::new(Column::string(NAME_FIELD, NAME_MAX_LENGTH).not_null()).with_default(""),
    )
});

/// Named location.
///
/// `name` is a `String(128)` non-null column of `states` under the database
/// backend and a plain attribute otherwise; it defaults to `""` either way.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    base: BaseModel,
}

impl State {
    /// The state's name. A non-text value (possible under the file backend)
    /// reads as empty.
    pub fn name(&self) -> &str {
        self.base
            .attribute(NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn set_name(&mut self, ctx: &Context, name: impl Into<String>) -> ModelResult<()> {
        self.set(ctx, NAME_FIELD, name.into())
    }
}

impl Model for State {
    fn schema() -> &'static ModelSchema {
        &SCHEMA
    }

    fn from_base(base: BaseModel) -> Self {
        Self { base }
    }

    fn base(&self) -> &BaseModel {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseModel {
        &mut self.base
    }
}

impl core::fmt::Display for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.base, f)
    }
}
