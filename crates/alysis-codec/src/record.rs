//! Record definition macro and field name projection

/// Project an in-memory field name onto its wire form.
///
/// One trailing underscore is dropped (`from_` becomes `from`), then
/// snake case becomes lower camel case (`block_hash` becomes
/// `blockHash`).
pub fn to_camel_case(name: &str) -> String {
    let name = name.strip_suffix('_').unwrap_or(name);
    let mut parts = name.split('_');
    let mut result = String::new();
    if let Some(first) = parts.next() {
        result.push_str(first);
    }
    for part in parts {
        let mut chars = part.chars();
        if let Some(first_char) = chars.next() {
            result.extend(first_char.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Define a record that maps to and from a JSON object.
///
/// Fields are read from the input object under their camel-cased
/// names. A field with a `= default` clause takes the default when
/// the key is absent; a field without one is required. Unknown input
/// keys are ignored. A JSON array is accepted as positional input,
/// filling fields in declaration order.
#[macro_export]
macro_rules! json_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fname:ident : $ftype:ty $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                pub $fname: $ftype,
            )*
        }

        impl $crate::Structure for $name {
            fn structure(
                value: &::serde_json::Value,
            ) -> ::std::result::Result<Self, $crate::StructuringError> {
                match value {
                    ::serde_json::Value::Object(map) => {
                        let mut errors: ::std::vec::Vec<$crate::StructuringError> =
                            ::std::vec::Vec::new();
                        $(
                            let $fname: ::std::option::Option<$ftype> = {
                                let wire_name = $crate::to_camel_case(stringify!($fname));
                                match map.get(wire_name.as_str()) {
                                    ::std::option::Option::Some(raw) => {
                                        match <$ftype as $crate::Structure>::structure(raw) {
                                            ::std::result::Result::Ok(parsed) => {
                                                ::std::option::Option::Some(parsed)
                                            }
                                            ::std::result::Result::Err(err) => {
                                                errors.push(err.nest(
                                                    $crate::PathItem::Field(stringify!($fname)),
                                                ));
                                                ::std::option::Option::None
                                            }
                                        }
                                    }
                                    ::std::option::Option::None => $crate::json_record!(
                                        @missing_object $fname, wire_name, errors $(, $default)?
                                    ),
                                }
                            };
                        )*

                        if errors.is_empty() {
                            if let ($(::std::option::Option::Some($fname),)*) = ($($fname,)*) {
                                return ::std::result::Result::Ok(Self { $($fname),* });
                            }
                        }
                        ::std::result::Result::Err($crate::StructuringError::group(
                            ::std::format!("Failed to structure into {}", stringify!($name)),
                            errors,
                        ))
                    }
                    ::serde_json::Value::Array(items) => {
                        let field_count = $crate::json_record!(@count $($fname)*);
                        if items.len() > field_count {
                            return ::std::result::Result::Err($crate::StructuringError::at_root(
                                ::std::format!(
                                    "Too many fields to serialize into {}",
                                    stringify!($name)
                                ),
                            ));
                        }

                        let mut errors: ::std::vec::Vec<$crate::StructuringError> =
                            ::std::vec::Vec::new();
                        let mut remaining = items.iter();
                        $(
                            let $fname: ::std::option::Option<$ftype> = match remaining.next() {
                                ::std::option::Option::Some(raw) => {
                                    match <$ftype as $crate::Structure>::structure(raw) {
                                        ::std::result::Result::Ok(parsed) => {
                                            ::std::option::Option::Some(parsed)
                                        }
                                        ::std::result::Result::Err(err) => {
                                            errors.push(err.nest(
                                                $crate::PathItem::Field(stringify!($fname)),
                                            ));
                                            ::std::option::Option::None
                                        }
                                    }
                                }
                                ::std::option::Option::None => $crate::json_record!(
                                    @missing_array $fname, errors $(, $default)?
                                ),
                            };
                        )*

                        if errors.is_empty() {
                            if let ($(::std::option::Option::Some($fname),)*) = ($($fname,)*) {
                                return ::std::result::Result::Ok(Self { $($fname),* });
                            }
                        }
                        ::std::result::Result::Err($crate::StructuringError::group(
                            ::std::format!("Failed to structure into {}", stringify!($name)),
                            errors,
                        ))
                    }
                    other => ::std::result::Result::Err($crate::StructuringError::at_root(
                        ::std::format!(
                            "Cannot structure into {} from {}",
                            stringify!($name),
                            $crate::json_type_name(other)
                        ),
                    )),
                }
            }
        }

        impl $crate::Unstructure for $name {
            fn unstructure(&self) -> ::serde_json::Value {
                let mut map = ::serde_json::Map::new();
                $(
                    map.insert(
                        $crate::to_camel_case(stringify!($fname)),
                        $crate::Unstructure::unstructure(&self.$fname),
                    );
                )*
                ::serde_json::Value::Object(map)
            }
        }
    };

    (@missing_object $fname:ident, $wire:ident, $errors:ident) => {{
        let snake = stringify!($fname);
        let message = if $wire == snake {
            ::std::format!("Missing field {}", snake)
        } else {
            ::std::format!("Missing field {} ({} in the input)", snake, $wire)
        };
        $errors.push($crate::StructuringError::at_root(message));
        ::std::option::Option::None
    }};
    (@missing_object $fname:ident, $wire:ident, $errors:ident, $default:expr) => {
        ::std::option::Option::Some($default)
    };

    (@missing_array $fname:ident, $errors:ident) => {{
        $errors.push($crate::StructuringError::at_root(::std::format!(
            "Missing positional argument {}",
            stringify!($fname)
        )));
        ::std::option::Option::None
    }};
    (@missing_array $fname:ident, $errors:ident, $default:expr) => {
        ::std::option::Option::Some($default)
    };

    (@count) => { 0usize };
    (@count $head:ident $($tail:ident)*) => {
        1usize + $crate::json_record!(@count $($tail)*)
    };
}
