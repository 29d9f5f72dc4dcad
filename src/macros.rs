/// Defines a `#[repr(u8)]` enum whose variants double as assembly names.
///
/// Generates `ALL`, `name()`, `from_name()` and `Display`, plus the `num_enum`
/// conversions to and from the raw byte.
macro_rules! byte_enum {
    (
        $( #[doc = $edoc:expr] )*
        $vis:vis enum $enum:ident {
            $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+
        }
    ) => {
        $( #[doc = $edoc] )*
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(::num_enum::TryFromPrimitive, ::num_enum::IntoPrimitive)]
        $vis enum $enum {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl $enum {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }

            /// Looks a variant up by its assembly name (case sensitive).
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|variant| variant.name() == name)
            }
        }

        impl ::std::fmt::Display for $enum {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}
