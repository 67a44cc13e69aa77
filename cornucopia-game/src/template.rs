//! `{placeholder}` substitution for flavor text.

use std::borrow::Cow;

/// Placeholder bindings applied to a template.
#[derive(Debug, Default, Clone)]
pub struct Bindings<'a> {
    pairs: Vec<(&'static str, Cow<'a, str>)>,
}

impl<'a> Bindings<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Bind `{key}` to `value`.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<Cow<'a, str>>) -> Self {
        self.pairs.push((key, value.into()));
        self
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<Cow<'a, str>>) {
        self.pairs.push((key, value.into()));
    }
}

/// True when `template` mentions `{key}`.
#[must_use]
pub fn mentions(template: &str, key: &str) -> bool {
    template.contains(&format!("{{{key}}}"))
}

/// Replace every bound placeholder; unbound placeholders are left as written.
#[must_use]
pub fn render(template: &str, bindings: &Bindings<'_>) -> String {
    let mut text = template.to_string();
    for (key, value) in &bindings.pairs {
        let token = format!("{{{key}}}");
        if text.contains(&token) {
            text = text.replace(&token, value);
        }
    }
    text
}
