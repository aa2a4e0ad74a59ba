//! Enumerated field values and their URI forms.

macro_rules! uri_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $local:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the SBOL2 URI for this value.
            pub fn uri(&self) -> &'static str {
                match self {
                    $($name::$variant => concat!("http://sbols.org/v2#", $local)),+
                }
            }

            /// Converts a URI to a value.
            pub fn from_uri(uri: &str) -> Option<$name> {
                match uri {
                    $(concat!("http://sbols.org/v2#", $local) => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

uri_enum! {
    /// Visibility of a component instance to MapsTo references from outside
    /// its parent.
    AccessType {
        Public => "public",
        Private => "private",
    }
}

uri_enum! {
    /// Direction of a functional component relative to its module.
    DirectionType {
        Input => "in",
        Output => "out",
        InOut => "inout",
        None => "none",
    }
}

uri_enum! {
    /// How a MapsTo reconciles its local and remote instances.
    RefinementType {
        UseRemote => "useRemote",
        UseLocal => "useLocal",
        VerifyIdentical => "verifyIdentical",
        Merge => "merge",
    }
}

uri_enum! {
    /// Relation a sequence constraint imposes between subject and object.
    RestrictionType {
        /// Subject is upstream of object.
        Precedes => "precedes",
        SameOrientationAs => "sameOrientationAs",
        OppositeOrientationAs => "oppositeOrientationAs",
    }
}

uri_enum! {
    /// Strand orientation of a location.
    OrientationType {
        Inline => "inline",
        ReverseComplement => "reverseComplement",
    }
}

impl OrientationType {
    /// Converts an SBOL1 strand symbol (`+` or `-`).
    pub fn from_strand(strand: &str) -> Option<OrientationType> {
        match strand.trim() {
            "+" => Some(OrientationType::Inline),
            "-" => Some(OrientationType::ReverseComplement),
            _ => None,
        }
    }

    /// Returns the SBOL1 strand symbol.
    pub fn strand(&self) -> &'static str {
        match self {
            OrientationType::Inline => "+",
            OrientationType::ReverseComplement => "-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_conversion() {
        for access in AccessType::ALL {
            assert_eq!(AccessType::from_uri(access.uri()), Some(*access));
        }
        assert_eq!(DirectionType::InOut.uri(), "http://sbols.org/v2#inout");
        assert_eq!(
            RestrictionType::from_uri("http://sbols.org/v2#precedes"),
            Some(RestrictionType::Precedes)
        );
        assert_eq!(RefinementType::from_uri("http://sbols.org/v2#bogus"), None);
    }

    #[test]
    fn test_strand() {
        assert_eq!(OrientationType::from_strand("+"), Some(OrientationType::Inline));
        assert_eq!(
            OrientationType::from_strand(" - "),
            Some(OrientationType::ReverseComplement)
        );
        assert_eq!(OrientationType::from_strand("?"), None);
        assert_eq!(OrientationType::ReverseComplement.strand(), "-");
    }
}
