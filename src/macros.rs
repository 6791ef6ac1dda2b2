/// Declare a fieldless enum backed by a wire value.
///
/// Generates `from_raw` (unknown values yield `None`) and `raw`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ty {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn from_raw(value: $repr) -> Option<Self> {
                match value {
                    $(v if v == $value => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn raw(self) -> $repr {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }
    };
}
