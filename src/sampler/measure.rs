//! Measures of sampled quantities.

/// The measure a sampled point (or a density) is expressed in. Dirac
/// components report a continuous pdf of 0 and a discrete pdf of +∞ at the
/// atom.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Measure {
    Continuous,
    Discrete,
}
