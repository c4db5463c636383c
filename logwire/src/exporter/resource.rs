//! Process-wide resource and schema metadata.

use crate::value::{encode, key_value, Value};
use opentelemetry_proto::tonic::resource::v1::Resource;

/// Resource attributes and schema URL shared by every batch.
///
/// # Example
///
/// ```
/// use logwire::ResourceMetadata;
///
/// let resource = ResourceMetadata::new("https://opentelemetry.io/schemas/1.12.0")
///     .with_service_name("checkout")
///     .with_attribute("deployment.environment", "staging");
///
/// assert_eq!(resource.to_proto().attributes.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceMetadata {
    schema_url: String,
    attributes: Vec<(String, Value)>,
}

impl ResourceMetadata {
    /// Creates metadata with the given schema URL and no attributes.
    #[must_use]
    pub fn new(schema_url: impl Into<String>) -> Self {
        Self {
            schema_url: schema_url.into(),
            attributes: Vec::new(),
        }
    }

    /// Adds a resource attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Sets the `service.name` attribute.
    #[must_use]
    pub fn with_service_name(self, name: impl Into<String>) -> Self {
        self.with_attribute("service.name", Value::Str(name.into()))
    }

    /// The schema URL.
    #[must_use]
    pub fn schema_url(&self) -> &str {
        &self.schema_url
    }

    /// Converts the attributes into an OTLP resource.
    #[must_use]
    pub fn to_proto(&self) -> Resource {
        Resource {
            attributes: self
                .attributes
                .iter()
                .filter_map(|(key, value)| key_value(key.clone(), encode(value.clone())))
                .collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry_proto::tonic::common::v1::any_value;

    #[test]
    fn test_resource_to_proto_keeps_order() {
        let resource = ResourceMetadata::new("schema")
            .with_service_name("example application")
            .with_attribute("host.cpus", 8u32);

        let proto = resource.to_proto();
        assert_eq!(resource.schema_url(), "schema");
        assert_eq!(proto.attributes.len(), 2);
        assert_eq!(proto.attributes[0].key, "service.name");
        assert_eq!(
            proto.attributes[0].value.as_ref().unwrap().value,
            Some(any_value::Value::StringValue("example application".into()))
        );
        assert_eq!(
            proto.attributes[1].value.as_ref().unwrap().value,
            Some(any_value::Value::IntValue(8))
        );
    }
}
