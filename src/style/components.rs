//! Class recipes for the kit's Button and Input components

use serde::{Deserialize, Serialize};

use super::{cn, ClassValue};

const BUTTON_BASE: &str = "flex-row items-center justify-center rounded-lg px-4 py-3 active:opacity-80";
const INPUT_BASE: &str = "w-full px-4 py-3 rounded-lg border bg-background text-foreground";

/// Placeholder text color of [`InputProps`]
pub const INPUT_PLACEHOLDER_COLOR: &str = "#9ca3af";
/// Classes of the label rendered above an input
pub const INPUT_LABEL_CLASSES: &str = "text-sm font-medium text-foreground mb-1.5";
/// Classes of the error text rendered below an input
pub const INPUT_ERROR_CLASSES: &str = "text-sm text-destructive mt-1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Outline,
    Ghost,
    Destructive,
}

impl ButtonVariant {
    fn classes(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "bg-primary",
            ButtonVariant::Secondary => "bg-secondary",
            ButtonVariant::Outline => "border border-border bg-transparent",
            ButtonVariant::Ghost => "bg-transparent",
            ButtonVariant::Destructive => "bg-destructive",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl ButtonSize {
    fn classes(self) -> &'static str {
        match self {
            ButtonSize::Sm => "px-3 py-2",
            ButtonSize::Md => "px-4 py-3",
            ButtonSize::Lg => "px-6 py-4",
        }
    }
}

/// Styling inputs of a button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonProps {
    pub variant: ButtonVariant,
    pub size: ButtonSize,
    pub full_width: bool,
    pub disabled: bool,
    pub loading: bool,
    pub class_name: Option<String>,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            variant: ButtonVariant::default(),
            size: ButtonSize::default(),
            full_width: true,
            disabled: false,
            loading: false,
            class_name: None,
        }
    }
}

impl ButtonProps {
    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    pub fn full_width(mut self, full_width: bool) -> Self {
        self.full_width = full_width;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// A loading button does not accept presses either
    pub fn is_disabled(&self) -> bool {
        self.disabled || self.loading
    }

    /// Color of the activity indicator shown while loading
    pub fn indicator_color(&self) -> &'static str {
        match self.variant {
            ButtonVariant::Outline | ButtonVariant::Ghost => "#666",
            _ => "#fff",
        }
    }

    /// Merged class list of the pressable
    pub fn classes(&self) -> String {
        cn([
            ClassValue::from(BUTTON_BASE),
            ClassValue::from(self.variant.classes()),
            ClassValue::from(self.size.classes()),
            ClassValue::from(("w-full", self.full_width)),
            ClassValue::from(("opacity-50", self.is_disabled())),
            ClassValue::from(self.class_name.as_deref()),
        ])
    }
}

/// Styling inputs of a text input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputProps {
    pub label: Option<String>,
    pub error: Option<String>,
    pub container_class_name: Option<String>,
    pub class_name: Option<String>,
}

impl InputProps {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn container_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.container_class_name = Some(class_name.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn container_classes(&self) -> String {
        cn([
            ClassValue::from("w-full"),
            ClassValue::from(self.container_class_name.as_deref()),
        ])
    }

    /// An empty error message does not count as an error
    pub fn has_error(&self) -> bool {
        self.error.as_deref().map_or(false, |e| !e.is_empty())
    }

    pub fn input_classes(&self) -> String {
        let border = if self.has_error() {
            "border-destructive"
        } else {
            "border-border"
        };
        cn([
            ClassValue::from(INPUT_BASE),
            ClassValue::from(border),
            ClassValue::from("focus:border-primary"),
            ClassValue::from(self.class_name.as_deref()),
        ])
    }
}
