#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    /// Bond order from an integer multiplicity, `None` outside 1..=3.
    pub fn from_multiplicity(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            _ => None,
        }
    }

    pub fn multiplicity(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
    /// Set during aromaticity perception for bonds inside an aromatic ring.
    pub is_aromatic: bool,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: false,
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::HasAromaticity for Bond {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicity_round_trip() {
        for n in 1..=3 {
            assert_eq!(BondOrder::from_multiplicity(n).unwrap().multiplicity(), n);
        }
    }

    #[test]
    fn multiplicity_out_of_range() {
        assert_eq!(BondOrder::from_multiplicity(0), None);
        assert_eq!(BondOrder::from_multiplicity(4), None);
    }

    #[test]
    fn default_is_single_non_aromatic() {
        let b = Bond::default();
        assert_eq!(b.order, BondOrder::Single);
        assert!(!b.is_aromatic);
    }
}
