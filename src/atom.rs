/// Atom type for a molecular graph node.
///
/// `Atom` stores the properties that end up in a SMILES atom: element,
/// charge, isotope, hydrogen count, unpaired electrons and aromaticity.
/// Coordinates are not stored here; the inference pipeline keeps them in a
/// separate slice indexed by node.
///
/// # Examples
///
/// ```
/// use geosmiles::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.formal_charge, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). Identifies the element.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units (e.g. −1 for a carboxylate oxygen).
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance (the common case).
    pub isotope: u16,
    /// Number of hydrogens folded into this atom.
    ///
    /// These are not graph nodes. Atoms built directly from coordinates
    /// start at zero and only gain a count when explicit hydrogen atoms are
    /// folded away by [`fold_hydrogens`](crate::hydrogen::fold_hydrogens).
    pub hydrogen_count: u8,
    /// Unpaired electrons, used when charged fragments are disallowed.
    pub radical_electrons: u8,
    /// Whether this atom is in an aromatic ring.
    ///
    /// Set during aromaticity perception. Bond orders keep their Kekulé
    /// assignment regardless of this flag.
    pub is_aromatic: bool,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasRadicalElectrons for Atom {
    fn radical_electrons(&self) -> u8 {
        self.radical_electrons
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}
