//! Locations of sequence annotations.

use crate::error::ValidationError;
use crate::model::{Identifiable, Identified, OrientationType, impl_identifiable};
use crate::validate::Rule;

/// A 1-based inclusive interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub identified: Identified,
    pub start: u64,
    pub end: u64,
    pub orientation: Option<OrientationType>,
}

impl Range {
    pub fn new(identified: Identified, start: u64, end: u64) -> Result<Self, ValidationError> {
        let range = Self {
            identified,
            start,
            end,
            orientation: None,
        };
        range.check_bounds()?;
        Ok(range)
    }

    pub fn with_orientation(mut self, orientation: OrientationType) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub(crate) fn check_bounds(&self) -> Result<(), ValidationError> {
        let id = self.identified.identity.as_str();
        if self.start == 0 {
            return Err(ValidationError::rule(Rule::RangeStart, [id]));
        }
        if self.end == 0 {
            return Err(ValidationError::rule(Rule::RangeEnd, [id]));
        }
        if self.start > self.end {
            return Err(ValidationError::rule(Rule::RangeOrder, [id]));
        }
        Ok(())
    }
}

/// A zero-width position after base `at`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    pub identified: Identified,
    pub at: u64,
    pub orientation: Option<OrientationType>,
}

impl Cut {
    pub fn new(identified: Identified, at: u64) -> Self {
        Self {
            identified,
            at,
            orientation: None,
        }
    }
}

/// A location with orientation but no coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericLocation {
    pub identified: Identified,
    pub orientation: Option<OrientationType>,
}

impl GenericLocation {
    pub fn new(identified: Identified) -> Self {
        Self {
            identified,
            orientation: None,
        }
    }
}

/// An ordered union of disjoint ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiRange {
    pub identified: Identified,
    pub ranges: Vec<Range>,
}

impl MultiRange {
    pub fn new(identified: Identified, ranges: Vec<Range>) -> Result<Self, ValidationError> {
        let multi = Self { identified, ranges };
        multi.check_ranges()?;
        Ok(multi)
    }

    /// Creates a child range with a compliant identity and keeps the ranges
    /// ordered.
    pub fn create_range(
        &mut self,
        display_id: &str,
        start: u64,
        end: u64,
    ) -> Result<&mut Range, ValidationError> {
        let range = Range::new(self.identified.child(display_id)?, start, end)?;
        let identity = range.identified.identity.clone();
        let mut ranges = self.ranges.clone();
        ranges.push(range);
        ranges.sort_by_key(|r| r.start);
        let candidate = MultiRange {
            identified: self.identified.clone(),
            ranges,
        };
        candidate.check_ranges()?;
        self.ranges = candidate.ranges;
        super::find_mut(&mut self.ranges, &identity)
            .ok_or_else(|| ValidationError::rule(Rule::IdentityRequired, [identity.as_str()]))
    }

    /// Total number of bases covered.
    pub fn len(&self) -> u64 {
        self.ranges.iter().map(|r| r.end - r.start + 1).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub(crate) fn check_ranges(&self) -> Result<(), ValidationError> {
        let id = self.identified.identity.as_str();
        if self.ranges.is_empty() {
            return Err(ValidationError::rule(Rule::MultiRangeRanges, [id]));
        }
        for range in &self.ranges {
            range.check_bounds()?;
        }
        for pair in self.ranges.windows(2) {
            if pair[0].end >= pair[1].start {
                return Err(ValidationError::rule(
                    Rule::MultiRangeOrder,
                    [pair[0].identity(), pair[1].identity()],
                ));
            }
        }
        if let Some(dup) = super::first_duplicate(self.ranges.iter().map(|r| r.identity())) {
            return Err(ValidationError::rule(Rule::IdentityUnique, [dup]));
        }
        Ok(())
    }
}

impl_identifiable!(Range, Cut, GenericLocation, MultiRange);

/// One location of a sequence annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Range(Range),
    Cut(Cut),
    GenericLocation(GenericLocation),
    MultiRange(MultiRange),
}

impl Location {
    /// Orientation of the location. A multi-range reports the orientation of
    /// its first range.
    pub fn orientation(&self) -> Option<OrientationType> {
        match self {
            Location::Range(r) => r.orientation,
            Location::Cut(c) => c.orientation,
            Location::GenericLocation(g) => g.orientation,
            Location::MultiRange(m) => m.ranges.first().and_then(|r| r.orientation),
        }
    }

    /// Checks coordinates and, in compliant mode, identities of the location
    /// and any ranges it owns.
    pub(crate) fn check(&self, compliant: bool, parent: &Identified) -> Result<(), ValidationError> {
        self.identified().check(compliant, Some(parent))?;
        match self {
            Location::Range(r) => r.check_bounds(),
            Location::Cut(_) | Location::GenericLocation(_) => Ok(()),
            Location::MultiRange(m) => {
                m.check_ranges()?;
                for range in &m.ranges {
                    range.identified.check(compliant, Some(&m.identified))?;
                }
                Ok(())
            }
        }
    }
}

impl Identifiable for Location {
    fn identified(&self) -> &Identified {
        match self {
            Location::Range(r) => &r.identified,
            Location::Cut(c) => &c.identified,
            Location::GenericLocation(g) => &g.identified,
            Location::MultiRange(m) => &m.identified,
        }
    }

    fn identified_mut(&mut self) -> &mut Identified {
        match self {
            Location::Range(r) => &mut r.identified,
            Location::Cut(c) => &mut c.identified,
            Location::GenericLocation(g) => &mut g.identified,
            Location::MultiRange(m) => &mut m.identified,
        }
    }
}

impl From<Range> for Location {
    fn from(r: Range) -> Self {
        Location::Range(r)
    }
}

impl From<Cut> for Location {
    fn from(c: Cut) -> Self {
        Location::Cut(c)
    }
}

impl From<GenericLocation> for Location {
    fn from(g: GenericLocation) -> Self {
        Location::GenericLocation(g)
    }
}

impl From<MultiRange> for Location {
    fn from(m: MultiRange) -> Self {
        Location::MultiRange(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identified {
        Identified::new(format!("http://example.org/{s}"))
    }

    #[test]
    fn test_range_bounds() {
        assert!(Range::new(id("r"), 1, 10).is_ok());
        assert!(Range::new(id("r"), 5, 5).is_ok());
        assert_eq!(
            Range::new(id("r"), 0, 10).unwrap_err().rule_id(),
            Some(Rule::RangeStart)
        );
        assert_eq!(
            Range::new(id("r"), 1, 0).unwrap_err().rule_id(),
            Some(Rule::RangeEnd)
        );
        assert_eq!(
            Range::new(id("r"), 10, 1).unwrap_err().rule_id(),
            Some(Rule::RangeOrder)
        );
    }

    #[test]
    fn test_multi_range_must_be_disjoint() {
        let a = Range::new(id("a"), 1, 10).unwrap();
        let b = Range::new(id("b"), 10, 20).unwrap();
        let err = MultiRange::new(id("m"), vec![a.clone(), b]).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::MultiRangeOrder));

        let c = Range::new(id("c"), 11, 20).unwrap();
        let multi = MultiRange::new(id("m"), vec![a, c]).unwrap();
        assert_eq!(multi.len(), 20);

        let err = MultiRange::new(id("m"), vec![]).unwrap_err();
        assert_eq!(err.rule_id(), Some(Rule::MultiRangeRanges));
    }

    #[test]
    fn test_multi_range_create_range_keeps_order() {
        let parent = Identified {
            persistent_identity: Some("http://example.org/m".into()),
            ..id("m")
        };
        let first = Range::new(parent.child("r2").unwrap(), 50, 60).unwrap();
        let mut multi = MultiRange::new(parent, vec![first]).unwrap();
        let created = multi.create_range("r1", 1, 10).unwrap();
        assert_eq!(created.start, 1);
        assert_eq!(multi.ranges[0].display_id(), Some("r1"));
        assert_eq!(multi.ranges[1].display_id(), Some("r2"));

        assert!(multi.create_range("r3", 55, 70).is_err());
        assert_eq!(multi.ranges.len(), 2);
    }

    #[test]
    fn test_location_orientation() {
        let r = Range::new(id("r"), 1, 2)
            .unwrap()
            .with_orientation(OrientationType::ReverseComplement);
        let loc = Location::from(r);
        assert_eq!(loc.orientation(), Some(OrientationType::ReverseComplement));
        assert_eq!(loc.identity(), "http://example.org/r");
    }
}
