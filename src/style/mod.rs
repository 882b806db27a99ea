//! Utility-class composition for the UI kit

mod components;
mod merge;

pub use components::*;
pub use merge::merge_classes;

/// One argument to [`cn`]: a class string, something that may be absent,
/// or a nested list
#[derive(Debug, Clone, PartialEq)]
pub enum ClassValue {
    /// One or more whitespace separated classes
    Classes(String),
    /// Contributes nothing
    Skip,
    /// Flattened in order
    List(Vec<ClassValue>),
}

impl From<&str> for ClassValue {
    fn from(classes: &str) -> Self {
        ClassValue::Classes(classes.to_string())
    }
}

impl From<String> for ClassValue {
    fn from(classes: String) -> Self {
        ClassValue::Classes(classes)
    }
}

impl From<&String> for ClassValue {
    fn from(classes: &String) -> Self {
        ClassValue::Classes(classes.clone())
    }
}

impl<T: Into<ClassValue>> From<Option<T>> for ClassValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ClassValue::Skip, Into::into)
    }
}

/// `("opacity-50", disabled)` keeps the class only when the flag is set
impl<T: Into<ClassValue>> From<(T, bool)> for ClassValue {
    fn from((value, keep): (T, bool)) -> Self {
        if keep {
            value.into()
        } else {
            ClassValue::Skip
        }
    }
}

impl<T: Into<ClassValue>> From<Vec<T>> for ClassValue {
    fn from(values: Vec<T>) -> Self {
        ClassValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl ClassValue {
    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ClassValue::Classes(classes) => out.extend(classes.split_whitespace()),
            ClassValue::Skip => {}
            ClassValue::List(values) => values.iter().for_each(|value| value.collect_into(out)),
        }
    }
}

/// Flatten class values and resolve conflicting utilities, last one wins.
///
/// ```
/// use starter_backend::style::{cn, ClassValue};
///
/// let merged = cn([ClassValue::from("px-4 py-2"), ClassValue::from("px-2")]);
/// assert_eq!(merged, "py-2 px-2");
/// ```
pub fn cn<I>(values: I) -> String
where
    I: IntoIterator,
    I::Item: Into<ClassValue>,
{
    let values: Vec<ClassValue> = values.into_iter().map(Into::into).collect();
    let mut classes = Vec::new();
    for value in &values {
        value.collect_into(&mut classes);
    }
    merge_classes(&classes)
}

/// Variadic form of [`cn`]; each argument may be any `Into<ClassValue>`.
///
/// ```
/// use starter_backend::cn;
///
/// let disabled = true;
/// assert_eq!(cn!("px-4", "px-2"), "px-2");
/// assert_eq!(cn!("foo", ("bar", disabled), None::<&str>), "foo bar");
/// ```
#[macro_export]
macro_rules! cn {
    ($($value:expr),* $(,)?) => {
        $crate::style::cn(::std::vec![$($crate::style::ClassValue::from($value)),*])
    };
}
