//! Switch

use crate::error::*;

/// Collects exactly one case per id in `[0, n)`.
pub struct SwitchBuilder<C> {
    /// Name used in errors.
    name: String,

    /// Cases indexed by id.
    cases: Vec<Option<C>>,
}

impl<C> SwitchBuilder<C> {
    /// Create a new `SwitchBuilder`.
    ///
    /// * `name` - Name of the switch.
    /// * `n`    - Number of ids.
    pub fn new(name: &str, n: usize) -> Self {
        Self {
            name: name.to_string(),
            cases: (0..n).map(|_| None).collect(),
        }
    }

    /// Adds the case for an id.
    ///
    /// * `id`   - The id.
    /// * `case` - The branch for `id`.
    pub fn add_case(&mut self, id: u32, case: C) -> Result<()> {
        let cases = self.cases.len();
        match self.cases.get_mut(id as usize) {
            None => Err(Error::UnreachableDispatch {
                switch: self.name.clone(),
                id,
                cases,
            }),
            Some(Some(_)) => Err(Error::DuplicateCase {
                switch: self.name.clone(),
                id,
            }),
            Some(slot) => {
                *slot = Some(case);
                Ok(())
            }
        }
    }

    /// Returns the switch or an error naming the first id without a case.
    pub fn build(self) -> Result<Switch<C>> {
        let name = self.name;
        let cases = self
            .cases
            .into_iter()
            .enumerate()
            .map(|(id, case)| {
                case.ok_or_else(|| Error::MissingCase {
                    switch: name.clone(),
                    id: id as u32,
                })
            })
            .collect::<Result<Vec<C>>>()?;
        Ok(Switch { name, cases })
    }
}

/// A complete switch over `[0, n)`. Any other id takes the default branch,
/// which fails with `Error::UnreachableDispatch`.
pub struct Switch<C> {
    /// Name used in errors.
    name: String,

    /// Cases indexed by id.
    cases: Vec<C>,
}

impl<C> Switch<C> {
    /// Returns the branch for an id.
    ///
    /// * `id` - The id.
    #[inline]
    pub fn case(&self, id: u32) -> Result<&C> {
        self.cases
            .get(id as usize)
            .ok_or_else(|| Error::UnreachableDispatch {
                switch: self.name.clone(),
                id,
                cases: self.cases.len(),
            })
    }

    /// Returns the name of the switch.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Returns true if the switch has no cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Returns an iterator over the cases in id order.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.cases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn switch_of(n: usize) -> Switch<usize> {
        let mut builder = SwitchBuilder::new("test", n);
        for id in (0..n).rev() {
            builder.add_case(id as u32, id * 10).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn duplicate_case_is_rejected() {
        let mut builder = SwitchBuilder::new("material", 2);
        builder.add_case(0, "a").unwrap();
        assert!(matches!(
            builder.add_case(0, "b"),
            Err(Error::DuplicateCase { id: 0, .. })
        ));
    }

    #[test]
    fn gap_is_rejected() {
        let mut builder = SwitchBuilder::new("material", 3);
        builder.add_case(0, "a").unwrap();
        builder.add_case(2, "c").unwrap();
        assert!(matches!(
            builder.build(),
            Err(Error::MissingCase { id: 1, .. })
        ));
    }

    #[test]
    fn case_outside_range_is_rejected() {
        let mut builder = SwitchBuilder::new("material", 1);
        assert!(matches!(
            builder.add_case(1, "b"),
            Err(Error::UnreachableDispatch { id: 1, cases: 1, .. })
        ));
    }

    #[test]
    fn empty_switch_always_fails() {
        let switch = switch_of(0);
        assert!(switch.is_empty());
        assert!(switch.case(0).is_err());
    }

    proptest! {
        #[test]
        fn every_id_dispatches_to_its_case(n in 1usize..64, id in 0u32..128) {
            let switch = switch_of(n);
            prop_assert_eq!(switch.len(), n);
            match switch.case(id) {
                Ok(v) => {
                    prop_assert!((id as usize) < n);
                    prop_assert_eq!(*v, id as usize * 10);
                }
                Err(Error::UnreachableDispatch { switch, id: got, cases }) => {
                    prop_assert!((id as usize) >= n);
                    prop_assert_eq!(switch, "test");
                    prop_assert_eq!(got, id);
                    prop_assert_eq!(cases, n);
                }
                Err(e) => prop_assert!(false, "unexpected error {}", e),
            }
        }
    }
}
