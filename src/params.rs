//! Query-string parameters.
//!
//! Values are converted to strings when they are added, so a [`Parameters`]
//! list can be rendered as a query string or sent as a form body unchanged.

use std::fmt;

/// A single `name=value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Conversion of scalar values into their query-string form.
pub trait ToParameterValue {
    fn to_parameter_value(&self) -> String;
}

impl ToParameterValue for str {
    fn to_parameter_value(&self) -> String {
        self.to_string()
    }
}

impl ToParameterValue for String {
    fn to_parameter_value(&self) -> String {
        self.clone()
    }
}

impl ToParameterValue for bool {
    fn to_parameter_value(&self) -> String {
        if *self { "true" } else { "false" }.to_string()
    }
}

macro_rules! integer_parameter_value {
    ($($ty:ty),*) => {
        $(
            impl ToParameterValue for $ty {
                fn to_parameter_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_parameter_value!(i32, i64, u32, u64, usize);

impl<T: ToParameterValue + ?Sized> ToParameterValue for &T {
    fn to_parameter_value(&self) -> String {
        (**self).to_parameter_value()
    }
}

/// A plain enumeration rendered as its lower-cased member name.
pub trait EnumParameter {
    fn variant_name(&self) -> &'static str;
}

/// A set of independent bit flags, such as the `include[]` options.
///
/// `MEMBERS` lists every named flag in declaration order. Use the
/// [`flag_set!`](crate::flag_set) macro to declare one.
pub trait FlagSet: Copy {
    const MEMBERS: &'static [(&'static str, u32)];

    fn bits(self) -> u32;
}

/// Declare a [`FlagSet`] newtype with `PascalCase` members.
///
/// ```
/// canvas_lms_client::flag_set! {
///     pub struct Extras {
///         const None = 0;
///         const AllDates = 1;
///     }
/// }
///
/// let extras = Extras::AllDates;
/// assert!(extras.contains(Extras::AllDates));
/// ```
#[macro_export]
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$flag_meta:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name(u32);

        #[allow(non_upper_case_globals)]
        impl $name {
            $(
                $(#[$flag_meta])*
                pub const $flag: Self = Self($value);
            )*

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl $crate::params::FlagSet for $name {
            const MEMBERS: &'static [(&'static str, u32)] = &[$((stringify!($flag), $value)),*];

            fn bits(self) -> u32 {
                self.0
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl ::std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

/// An ordered list of query parameters. Duplicate names are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    items: Vec<Parameter>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scalar value.
    pub fn add(mut self, name: impl Into<String>, value: impl ToParameterValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl ToParameterValue) {
        self.items
            .push(Parameter::new(name, value.to_parameter_value()));
    }

    /// Append a plain enum value as its lower-cased member name.
    pub fn add_enum<E: EnumParameter>(mut self, name: impl Into<String>, value: E) -> Self {
        self.push_enum(name, value);
        self
    }

    pub fn push_enum<E: EnumParameter>(&mut self, name: impl Into<String>, value: E) {
        self.items.push(Parameter::new(
            name,
            value.variant_name().to_lowercase(),
        ));
    }

    /// Append one parameter per flag set in `value`, in declaration order.
    ///
    /// Member names are written in snake_case (`AllDates` becomes `all_dates`).
    /// The zero member is never written.
    pub fn add_flags<F: FlagSet>(mut self, name: impl Into<String>, value: F) -> Self {
        self.push_flags(name, value);
        self
    }

    pub fn push_flags<F: FlagSet>(&mut self, name: impl Into<String>, value: F) {
        let name = name.into();
        let bits = value.bits();
        for (member, flag) in F::MEMBERS {
            if *flag == 0 || bits & flag != *flag {
                continue;
            }
            self.items
                .push(Parameter::new(name.clone(), to_snake_case(member)));
        }
    }

    pub fn extend_from(&mut self, other: Parameters) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.items.iter()
    }

    /// Name/value pairs for form-encoded request bodies.
    pub fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.items
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect()
    }

    /// `true` if any parameter has this name.
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|p| p.name == name)
    }

    /// `url` with these parameters appended, continuing an existing query with `&`.
    pub fn append_to(&self, url: &str) -> String {
        let rendered = self.to_string();
        match rendered.strip_prefix('?') {
            Some(query) if url.contains('?') => format!("{}&{}", url, query),
            _ => format!("{}{}", url, rendered),
        }
    }
}

impl fmt::Display for Parameters {
    /// Renders as `?a=1&b=2`, or nothing at all when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.items.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            let value: String = url::form_urlencoded::byte_serialize(p.value.as_bytes()).collect();
            write!(f, "{}{}={}", sep, p.name, value)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Parameters {
    type Item = Parameter;
    type IntoIter = std::vec::IntoIter<Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| Parameter::new(k, v))
            .collect()
    }
}

/// `AllDates` -> `all_dates`, `TotalStudents` -> `total_students`, `TA` -> `ta`.
pub(crate) fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
