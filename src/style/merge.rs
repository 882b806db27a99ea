//! Conflict resolution between utility classes
//!
//! Each recognised class maps to a group (the CSS property it sets). Walking
//! the list backwards, the first class seen for a group under a given set of
//! variants wins and every earlier one is dropped. Some groups also shadow
//! narrower ones: `p-4` hides an earlier `px-2`, but `px-2` after `p-4`
//! survives because it is more specific.

use std::collections::HashSet;

type Resolver = fn(prefix: &str, value: &str) -> Option<&'static str>;

const FONT_SIZES: &[&str] = &[
    "xs", "sm", "base", "lg", "xl", "2xl", "3xl", "4xl", "5xl", "6xl", "7xl", "8xl", "9xl",
];
const FONT_WEIGHTS: &[&str] = &[
    "thin", "extralight", "light", "normal", "medium", "semibold", "bold", "extrabold", "black",
];
const SHADOW_SIZES: &[&str] = &["", "sm", "md", "lg", "xl", "2xl", "inner", "none"];
const SIZE_KEYWORDS: &[&str] = &[
    "auto", "px", "full", "screen", "min", "max", "fit", "none", "prose", "svw", "svh", "lvw", "lvh", "dvw", "dvh",
    "md", "screen-sm", "screen-md", "screen-lg", "screen-xl", "screen-2xl",
];
const BORDER_STYLES: &[&str] = &["solid", "dashed", "dotted", "double", "hidden", "none"];

/// Whole-class matches
const EXACT: &[(&str, &str)] = &[
    ("block", "display"),
    ("inline-block", "display"),
    ("inline", "display"),
    ("flex", "display"),
    ("inline-flex", "display"),
    ("table", "display"),
    ("inline-table", "display"),
    ("table-cell", "display"),
    ("table-row", "display"),
    ("flow-root", "display"),
    ("grid", "display"),
    ("inline-grid", "display"),
    ("contents", "display"),
    ("list-item", "display"),
    ("hidden", "display"),
    ("static", "position"),
    ("fixed", "position"),
    ("absolute", "position"),
    ("relative", "position"),
    ("sticky", "position"),
    ("visible", "visibility"),
    ("invisible", "visibility"),
    ("collapse", "visibility"),
    ("italic", "font-style"),
    ("not-italic", "font-style"),
    ("uppercase", "text-transform"),
    ("lowercase", "text-transform"),
    ("capitalize", "text-transform"),
    ("normal-case", "text-transform"),
    ("underline", "text-decoration"),
    ("overline", "text-decoration"),
    ("line-through", "text-decoration"),
    ("no-underline", "text-decoration"),
    ("truncate", "text-overflow"),
    ("isolate", "isolation"),
    ("isolation-auto", "isolation"),
    ("sr-only", "sr"),
    ("not-sr-only", "sr"),
];

/// `prefix` or `prefix-<value>` matches; the longest prefix wins
const PREFIXES: &[(&str, Resolver)] = &[
    ("p", spacing),
    ("px", spacing),
    ("py", spacing),
    ("pt", spacing),
    ("pr", spacing),
    ("pb", spacing),
    ("pl", spacing),
    ("ps", spacing),
    ("pe", spacing),
    ("m", spacing),
    ("mx", spacing),
    ("my", spacing),
    ("mt", spacing),
    ("mr", spacing),
    ("mb", spacing),
    ("ml", spacing),
    ("ms", spacing),
    ("me", spacing),
    ("gap", spacing),
    ("gap-x", spacing),
    ("gap-y", spacing),
    ("space-x", spacing),
    ("space-y", spacing),
    ("w", spacing),
    ("h", spacing),
    ("min-w", spacing),
    ("min-h", spacing),
    ("max-w", spacing),
    ("max-h", spacing),
    ("size", spacing),
    ("inset", spacing),
    ("inset-x", spacing),
    ("inset-y", spacing),
    ("top", spacing),
    ("right", spacing),
    ("bottom", spacing),
    ("left", spacing),
    ("z", same),
    ("opacity", same),
    ("order", same),
    ("basis", spacing),
    ("grow", same),
    ("shrink", same),
    ("aspect", same),
    ("leading", same),
    ("tracking", same),
    ("line-clamp", same),
    ("cursor", same),
    ("select", same),
    ("pointer-events", same),
    ("resize", same),
    ("transition", same),
    ("duration", same),
    ("ease", same),
    ("delay", same),
    ("animate", same),
    ("scale", same),
    ("scale-x", same),
    ("scale-y", same),
    ("rotate", same),
    ("translate-x", same),
    ("translate-y", same),
    ("origin", same),
    ("whitespace", same),
    ("break", same),
    ("align", same),
    ("list", same),
    ("overflow", same),
    ("overflow-x", same),
    ("overflow-y", same),
    ("grid-cols", same),
    ("grid-rows", same),
    ("col-span", same),
    ("row-span", same),
    ("placeholder", same),
    ("items", align_items),
    ("content", align_content),
    ("self", align_self),
    ("justify", justify_content),
    ("justify-items", same),
    ("justify-self", same),
    ("place-content", same),
    ("place-items", same),
    ("place-self", same),
    ("rounded", same),
    ("rounded-s", same),
    ("rounded-e", same),
    ("rounded-t", same),
    ("rounded-r", same),
    ("rounded-b", same),
    ("rounded-l", same),
    ("rounded-ss", same),
    ("rounded-se", same),
    ("rounded-ee", same),
    ("rounded-es", same),
    ("rounded-tl", same),
    ("rounded-tr", same),
    ("rounded-br", same),
    ("rounded-bl", same),
    ("border", border),
    ("border-x", border),
    ("border-y", border),
    ("border-s", border),
    ("border-e", border),
    ("border-t", border),
    ("border-r", border),
    ("border-b", border),
    ("border-l", border),
    ("text", text),
    ("font", font),
    ("bg", background),
    ("shadow", shadow),
    ("ring", ring),
    ("ring-offset", ring_offset),
    ("outline", outline),
    ("flex", flex),
    ("object", object),
];

/// The group is named after the prefix
fn same(prefix: &str, _value: &str) -> Option<&'static str> {
    PREFIXES.iter().map(|(p, _)| *p).find(|p| *p == prefix)
}

/// Like [`same`], but only for values that are sizes
fn spacing(prefix: &str, value: &str) -> Option<&'static str> {
    let sized = is_length(value)
        || is_fraction(value)
        || arbitrary(value).is_some()
        || SIZE_KEYWORDS.contains(&value)
        || FONT_SIZES.contains(&value);
    if sized {
        same(prefix, value)
    } else {
        None
    }
}

fn is_fraction(value: &str) -> bool {
    value
        .split_once('/')
        .map_or(false, |(a, b)| is_number(a) && is_number(b))
}

fn align_items(_prefix: &str, _value: &str) -> Option<&'static str> {
    Some("align-items")
}

fn align_content(_prefix: &str, _value: &str) -> Option<&'static str> {
    Some("align-content")
}

fn align_self(_prefix: &str, _value: &str) -> Option<&'static str> {
    Some("align-self")
}

fn justify_content(_prefix: &str, _value: &str) -> Option<&'static str> {
    Some("justify-content")
}

fn is_number(value: &str) -> bool {
    !value.is_empty() && value.parse::<f64>().is_ok()
}

fn arbitrary(value: &str) -> Option<&str> {
    value.strip_prefix('[').and_then(|v| v.strip_suffix(']'))
}

fn is_length(value: &str) -> bool {
    if is_number(value) || value == "px" {
        return true;
    }
    match arbitrary(value) {
        Some(inner) => {
            inner.starts_with("length:")
                || ["px", "rem", "em", "%", "vh", "vw"].iter().any(|unit| {
                    inner
                        .strip_suffix(unit)
                        .map_or(false, |n| is_number(n))
                })
        }
        None => false,
    }
}

fn border(prefix: &str, value: &str) -> Option<&'static str> {
    if prefix == "border" {
        if BORDER_STYLES.contains(&value) {
            return Some("border-style");
        }
        if value == "collapse" || value == "separate" {
            return Some("border-collapse");
        }
    }
    let width = value.is_empty() || is_length(value);
    match (prefix, width) {
        ("border", true) => Some("border-w"),
        ("border-x", true) => Some("border-w-x"),
        ("border-y", true) => Some("border-w-y"),
        ("border-s", true) => Some("border-w-s"),
        ("border-e", true) => Some("border-w-e"),
        ("border-t", true) => Some("border-w-t"),
        ("border-r", true) => Some("border-w-r"),
        ("border-b", true) => Some("border-w-b"),
        ("border-l", true) => Some("border-w-l"),
        ("border-x", false) => Some("border-color-x"),
        ("border-y", false) => Some("border-color-y"),
        ("border-s", false) => Some("border-color-s"),
        ("border-e", false) => Some("border-color-e"),
        ("border-t", false) => Some("border-color-t"),
        ("border-r", false) => Some("border-color-r"),
        ("border-b", false) => Some("border-color-b"),
        ("border-l", false) => Some("border-color-l"),
        _ => Some("border-color"),
    }
}

fn text(_prefix: &str, value: &str) -> Option<&'static str> {
    match value {
        v if FONT_SIZES.contains(&v) || is_length(v) => Some("font-size"),
        "left" | "center" | "right" | "justify" | "start" | "end" => Some("text-align"),
        "ellipsis" | "clip" => Some("text-overflow"),
        "wrap" | "nowrap" | "balance" | "pretty" => Some("text-wrap"),
        _ => Some("text-color"),
    }
}

fn font(_prefix: &str, value: &str) -> Option<&'static str> {
    if FONT_WEIGHTS.contains(&value) || is_number(value) {
        Some("font-weight")
    } else {
        Some("font-family")
    }
}

fn background(_prefix: &str, value: &str) -> Option<&'static str> {
    match value {
        "fixed" | "local" | "scroll" => Some("bg-attachment"),
        "repeat" | "no-repeat" | "repeat-x" | "repeat-y" | "repeat-round" | "repeat-space" => Some("bg-repeat"),
        "auto" | "cover" | "contain" => Some("bg-size"),
        "bottom" | "center" | "left" | "left-bottom" | "left-top" | "right" | "right-bottom" | "right-top"
        | "top" => Some("bg-position"),
        "none" => Some("bg-image"),
        v if v.starts_with("gradient-to-") => Some("bg-image"),
        v if v.starts_with("clip-") => Some("bg-clip"),
        v if v.starts_with("origin-") => Some("bg-origin"),
        _ => Some("bg-color"),
    }
}

fn shadow(_prefix: &str, value: &str) -> Option<&'static str> {
    if SHADOW_SIZES.contains(&value) {
        Some("shadow")
    } else {
        Some("shadow-color")
    }
}

fn ring(_prefix: &str, value: &str) -> Option<&'static str> {
    match value {
        "" => Some("ring-w"),
        "inset" => Some("ring-inset"),
        v if is_length(v) => Some("ring-w"),
        _ => Some("ring-color"),
    }
}

fn ring_offset(_prefix: &str, value: &str) -> Option<&'static str> {
    if is_length(value) {
        Some("ring-offset-w")
    } else {
        Some("ring-offset-color")
    }
}

fn outline(_prefix: &str, value: &str) -> Option<&'static str> {
    match value {
        "" | "none" | "dashed" | "dotted" | "double" => Some("outline-style"),
        v if is_length(v) => Some("outline-w"),
        _ => Some("outline-color"),
    }
}

fn flex(_prefix: &str, value: &str) -> Option<&'static str> {
    match value {
        "row" | "row-reverse" | "col" | "col-reverse" => Some("flex-direction"),
        "wrap" | "wrap-reverse" | "nowrap" => Some("flex-wrap"),
        _ => Some("flex"),
    }
}

fn object(_prefix: &str, value: &str) -> Option<&'static str> {
    match value {
        "contain" | "cover" | "fill" | "none" | "scale-down" => Some("object-fit"),
        _ => Some("object-position"),
    }
}

/// Groups hidden by a later class of `group`
fn conflicts_of(group: &str) -> &'static [&'static str] {
    match group {
        "p" => &["px", "py", "ps", "pe", "pt", "pr", "pb", "pl"],
        "px" => &["pr", "pl"],
        "py" => &["pt", "pb"],
        "m" => &["mx", "my", "ms", "me", "mt", "mr", "mb", "ml"],
        "mx" => &["mr", "ml"],
        "my" => &["mt", "mb"],
        "size" => &["w", "h"],
        "gap" => &["gap-x", "gap-y"],
        "inset" => &["inset-x", "inset-y", "top", "right", "bottom", "left"],
        "inset-x" => &["right", "left"],
        "inset-y" => &["top", "bottom"],
        "overflow" => &["overflow-x", "overflow-y"],
        "scale" => &["scale-x", "scale-y"],
        "font-size" => &["leading"],
        "rounded" => &[
            "rounded-s",
            "rounded-e",
            "rounded-t",
            "rounded-r",
            "rounded-b",
            "rounded-l",
            "rounded-ss",
            "rounded-se",
            "rounded-ee",
            "rounded-es",
            "rounded-tl",
            "rounded-tr",
            "rounded-br",
            "rounded-bl",
        ],
        "rounded-s" => &["rounded-ss", "rounded-es"],
        "rounded-e" => &["rounded-se", "rounded-ee"],
        "rounded-t" => &["rounded-tl", "rounded-tr"],
        "rounded-r" => &["rounded-tr", "rounded-br"],
        "rounded-b" => &["rounded-br", "rounded-bl"],
        "rounded-l" => &["rounded-tl", "rounded-bl"],
        "border-w" => &[
            "border-w-x",
            "border-w-y",
            "border-w-s",
            "border-w-e",
            "border-w-t",
            "border-w-r",
            "border-w-b",
            "border-w-l",
        ],
        "border-w-x" => &["border-w-r", "border-w-l"],
        "border-w-y" => &["border-w-t", "border-w-b"],
        "border-color" => &[
            "border-color-x",
            "border-color-y",
            "border-color-s",
            "border-color-e",
            "border-color-t",
            "border-color-r",
            "border-color-b",
            "border-color-l",
        ],
        "border-color-x" => &["border-color-r", "border-color-l"],
        "border-color-y" => &["border-color-t", "border-color-b"],
        _ => &[],
    }
}

/// Group of an unprefixed, non-important class
fn class_group(base: &str) -> Option<&'static str> {
    if let Some((_, group)) = EXACT.iter().find(|(class, _)| *class == base) {
        return Some(*group);
    }

    let (prefix, resolve) = PREFIXES
        .iter()
        .filter(|(prefix, _)| {
            base == *prefix
                || base
                    .strip_prefix(prefix)
                    .map_or(false, |rest| rest.starts_with('-') && rest.len() > 1)
        })
        .max_by_key(|(prefix, _)| prefix.len())?;

    let value = base.get(prefix.len() + 1..).unwrap_or("");
    resolve(prefix, value)
}

/// Split `md:hover:px-2` into its variants and the base class, ignoring
/// colons inside arbitrary values
fn split_variants(class: &str) -> (Vec<&str>, &str) {
    let mut variants = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in class.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                variants.push(&class[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    (variants, &class[start..])
}

/// Conflict key of a class, or `None` for classes outside any known group
fn conflict_scope(class: &str) -> Option<(String, &'static str)> {
    let (mut variants, base) = split_variants(class);

    let (base, important) = match (base.strip_prefix('!'), base.strip_suffix('!')) {
        (Some(rest), _) => (rest, true),
        (None, Some(rest)) => (rest, true),
        (None, None) => (base, false),
    };
    let base = base.strip_prefix('-').unwrap_or(base);
    let group = class_group(base)?;

    // Variant order only matters around arbitrary variants
    if !variants.iter().any(|v| v.starts_with('[')) {
        variants.sort_unstable();
    }
    let mut scope = variants.join(":");
    scope.push(':');
    if important {
        scope.push('!');
    }
    Some((scope, group))
}

/// Drop every class overridden by a later one in the same group.
///
/// Classes outside any known group are always kept; order is preserved.
pub fn merge_classes(classes: &[&str]) -> String {
    let mut taken: HashSet<String> = HashSet::new();
    let mut kept: Vec<&str> = Vec::with_capacity(classes.len());

    for &class in classes.iter().rev() {
        let Some((scope, group)) = conflict_scope(class) else {
            kept.push(class);
            continue;
        };

        if !taken.insert(format!("{}{}", scope, group)) {
            continue;
        }
        for hidden in conflicts_of(group) {
            taken.insert(format!("{}{}", scope, hidden));
        }
        kept.push(class);
    }

    kept.reverse();
    kept.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(classes: &str) -> String {
        let classes: Vec<&str> = classes.split_whitespace().collect();
        merge_classes(&classes)
    }

    #[test]
    fn last_of_a_group_wins() {
        assert_eq!(merge("px-4 px-2"), "px-2");
        assert_eq!(merge("text-sm text-lg"), "text-lg");
        assert_eq!(merge("flex hidden"), "hidden");
        assert_eq!(merge("bg-primary bg-transparent"), "bg-transparent");
    }

    #[test]
    fn shorthand_hides_earlier_longhand() {
        assert_eq!(merge("px-2 py-1 p-4"), "p-4");
        assert_eq!(merge("p-4 px-2"), "p-4 px-2");
        assert_eq!(merge("rounded-tl-md rounded-lg"), "rounded-lg");
        assert_eq!(merge("w-4 h-4 size-8"), "size-8");
    }

    #[test]
    fn different_properties_coexist() {
        assert_eq!(merge("text-sm text-foreground"), "text-sm text-foreground");
        assert_eq!(merge("border border-border"), "border border-border");
        assert_eq!(merge("font-medium font-mono"), "font-medium font-mono");
        assert_eq!(merge("flex-row flex-1 flex"), "flex-row flex-1 flex");
    }

    #[test]
    fn side_specific_borders() {
        assert_eq!(merge("border-2 border-t-4"), "border-2 border-t-4");
        assert_eq!(merge("border-t-4 border-2"), "border-2");
        assert_eq!(merge("border-destructive border-border"), "border-border");
        assert_eq!(merge("border-solid border-dashed"), "border-dashed");
    }

    #[test]
    fn variants_scope_conflicts() {
        assert_eq!(
            merge("hover:bg-red-500 bg-blue-500 hover:bg-green-500"),
            "bg-blue-500 hover:bg-green-500"
        );
        assert_eq!(merge("active:opacity-80 opacity-50"), "active:opacity-80 opacity-50");
        assert_eq!(merge("md:hover:p-2 hover:md:p-4"), "hover:md:p-4");
    }

    #[test]
    fn important_and_negative() {
        assert_eq!(merge("!p-2 p-4"), "!p-2 p-4");
        assert_eq!(merge("!p-2 !p-4"), "!p-4");
        assert_eq!(merge("-mt-2 mt-4"), "mt-4");
    }

    #[test]
    fn arbitrary_values() {
        assert_eq!(merge("text-[14px] text-sm"), "text-sm");
        assert_eq!(merge("text-[#fff] text-sm"), "text-[#fff] text-sm");
        assert_eq!(merge("w-[calc(100%-2rem)] w-full"), "w-full");
    }

    #[test]
    fn max_width_scale_conflicts() {
        assert_eq!(merge("max-w-md max-w-lg"), "max-w-lg");
        assert_eq!(merge("max-w-screen-md max-w-sm"), "max-w-sm");
        assert_eq!(merge("max-w-xl max-w-screen-2xl"), "max-w-screen-2xl");
        assert_eq!(merge("w-md w-full"), "w-full");
        assert_eq!(merge("max-w-md max-h-md"), "max-w-md max-h-md");
    }

    #[test]
    fn unknown_classes_are_kept() {
        assert_eq!(merge("foo bar foo"), "foo bar foo");
        assert_eq!(merge("my-card p-2"), "my-card p-2");
    }

    #[test]
    fn font_size_resets_line_height() {
        assert_eq!(merge("leading-9 text-lg"), "text-lg");
        assert_eq!(merge("text-lg leading-9"), "text-lg leading-9");
    }
}
