use blink_types::ActionParameter;

/// One invocable unit of an action, rendered as a button or an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionComponent {
    label: String,
    href: String,
    parameter: Option<ActionParameter>,
    current_value: String,
}

impl ActionComponent {
    /// Create a component; only the first parameter is kept.
    pub fn new(
        label: impl Into<String>,
        href: impl Into<String>,
        parameters: Option<Vec<ActionParameter>>,
    ) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            parameter: parameters.and_then(|params| params.into_iter().next()),
            current_value: String::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The href as received, placeholders included
    pub fn href_template(&self) -> &str {
        &self.href
    }

    /// The href to POST to, with `{name}` replaced by the trimmed input value.
    ///
    /// The value is not URL-encoded; callers supply URL-safe input.
    pub fn href(&self) -> String {
        match &self.parameter {
            Some(parameter) => self.href.replace(
                &format!("{{{}}}", parameter.name),
                self.current_value.trim(),
            ),
            None => self.href.clone(),
        }
    }

    pub fn parameter(&self) -> Option<&ActionParameter> {
        self.parameter.as_ref()
    }

    pub fn has_parameter(&self) -> bool {
        self.parameter.is_some()
    }

    pub fn value(&self) -> &str {
        &self.current_value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.current_value = value.into();
    }

    pub fn reset(&mut self) {
        self.current_value.clear();
    }
}
