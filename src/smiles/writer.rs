use std::collections::{BTreeSet, HashMap, HashSet};

use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::canonical::canonical_ordering;
use crate::element::Element;
use crate::graph_ops::connected_components;
use crate::mol::{permutation_parity, AtomId, EZStereo, Mol};

/// SMILES in input atom order. Fragments follow their lowest atom index.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    connected_components(mol)
        .iter()
        .map(|component| write_fragment(mol, component, None))
        .collect::<Vec<_>>()
        .join(".")
}

/// SMILES that is the same string for every numbering of the same molecule.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    let ranks = canonical_ordering(mol);
    let mut parts: Vec<String> = connected_components(mol)
        .iter()
        .map(|component| write_fragment(mol, component, Some(ranks.as_slice())))
        .collect();
    parts.sort();
    parts.join(".")
}

#[derive(Clone, Copy)]
struct RingBond {
    edge: EdgeIndex,
    other: NodeIndex,
    digit: usize,
}

/// Depth-first spanning tree of one fragment, in writing order.
struct Traversal {
    position: Vec<Option<usize>>,
    parent: Vec<Option<NodeIndex>>,
    children: Vec<Vec<NodeIndex>>,
    /// Ring bonds per atom as written: closures first, then openings.
    rings: Vec<Vec<RingBond>>,
}

impl Traversal {
    fn new<A, B>(mol: &Mol<A, B>, start: NodeIndex, neighbor_lists: &[Vec<NodeIndex>]) -> Self {
        let n = mol.atom_count();
        let mut position = vec![None; n];
        let mut parent = vec![None; n];
        let mut children = vec![Vec::new(); n];
        let mut order = vec![start];
        let mut seen_ring_edges = HashSet::new();
        let mut ring_edges = Vec::new();

        position[start.index()] = Some(0);
        let mut stack = vec![(start, 0usize)];
        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let Some(&nb) = neighbor_lists[node.index()].get(top.1) else {
                stack.pop();
                continue;
            };
            top.1 += 1;
            if position[nb.index()].is_none() {
                position[nb.index()] = Some(order.len());
                order.push(nb);
                parent[nb.index()] = Some(node);
                children[node.index()].push(nb);
                stack.push((nb, 0));
            } else if parent[node.index()] != Some(nb) {
                if let Some(edge) = mol.bond_between(node, nb) {
                    if seen_ring_edges.insert(edge) {
                        ring_edges.push((node, nb, edge));
                    }
                }
            }
        }

        let mut opens: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
        let mut closes: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
        for (a, b, edge) in ring_edges {
            let (first, second) = if position[a.index()] < position[b.index()] {
                (a, b)
            } else {
                (b, a)
            };
            opens[first.index()].push((second, edge));
            closes[second.index()].push((first, edge));
        }

        // Lowest free digit at each opening; a digit is released once its
        // closing atom has been written.
        let mut digits: HashMap<EdgeIndex, usize> = HashMap::new();
        let mut in_use = BTreeSet::new();
        let mut rings = vec![Vec::new(); n];
        for &atom in &order {
            let mut closing: Vec<RingBond> = closes[atom.index()]
                .iter()
                .filter_map(|&(other, edge)| {
                    let digit = *digits.get(&edge)?;
                    Some(RingBond { edge, other, digit })
                })
                .collect();
            closing.sort_by_key(|r| position[r.other.index()]);

            let mut opening_targets = opens[atom.index()].clone();
            opening_targets.sort_by_key(|&(other, _)| position[other.index()]);
            let mut opening = Vec::with_capacity(opening_targets.len());
            for (other, edge) in opening_targets {
                let mut digit = 1;
                while in_use.contains(&digit) {
                    digit += 1;
                }
                in_use.insert(digit);
                digits.insert(edge, digit);
                opening.push(RingBond { edge, other, digit });
            }
            for ring in &closing {
                in_use.remove(&ring.digit);
            }

            closing.extend(opening);
            rings[atom.index()] = closing;
        }

        Self {
            position,
            parent,
            children,
            rings,
        }
    }

    fn position(&self, atom: NodeIndex) -> Option<usize> {
        self.position[atom.index()]
    }

    /// Parent then children, i.e. tree neighbors in writing order.
    fn tree_neighbors(&self, atom: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.parent[atom.index()]
            .into_iter()
            .chain(self.children[atom.index()].iter().copied())
    }

    fn is_child(&self, atom: NodeIndex, of: NodeIndex) -> bool {
        self.parent[atom.index()] == Some(of)
    }
}

fn write_fragment(mol: &Mol<Atom, Bond>, component: &[NodeIndex], ranks: Option<&[usize]>) -> String {
    let start = match ranks {
        Some(r) => component
            .iter()
            .copied()
            .min_by_key(|&atom| (mol.neighbors(atom).count(), r[atom.index()])),
        None => component.first().copied(),
    };
    let Some(start) = start else {
        return String::new();
    };

    let neighbor_lists: Vec<Vec<NodeIndex>> = mol
        .atoms()
        .map(|atom| {
            let mut nbs: Vec<NodeIndex> = mol.neighbors(atom).collect();
            match ranks {
                Some(r) => nbs.sort_by_key(|nb| r[nb.index()]),
                None => nbs.sort(),
            }
            nbs
        })
        .collect();

    let traversal = Traversal::new(mol, start, &neighbor_lists);
    let directions = assign_bond_directions(mol, &traversal);
    let mut out = String::new();
    write_branch(mol, start, &traversal, &directions, &mut out);
    out
}

fn write_branch(
    mol: &Mol<Atom, Bond>,
    node: NodeIndex,
    traversal: &Traversal,
    directions: &HashMap<EdgeIndex, char>,
    out: &mut String,
) {
    write_atom(mol, node, chirality_mark(mol, node, traversal), out);

    for ring in &traversal.rings[node.index()] {
        if traversal.position(ring.other) > traversal.position(node) {
            push_bond(mol, ring.edge, directions, out);
        }
        push_ring_label(ring.digit, out);
    }

    let children = &traversal.children[node.index()];
    for (i, &child) in children.iter().enumerate() {
        let branch = i + 1 < children.len();
        if branch {
            out.push('(');
        }
        if let Some(edge) = mol.bond_between(node, child) {
            push_bond(mol, edge, directions, out);
        }
        write_branch(mol, child, traversal, directions, out);
        if branch {
            out.push(')');
        }
    }
}

fn push_bond(
    mol: &Mol<Atom, Bond>,
    edge: EdgeIndex,
    directions: &HashMap<EdgeIndex, char>,
    out: &mut String,
) {
    if let Some(&marker) = directions.get(&edge) {
        out.push(marker);
        return;
    }
    let bond = mol.bond(edge);
    if bond.is_aromatic {
        return;
    }
    match bond.order {
        BondOrder::Single => {
            let both_aromatic = mol
                .bond_endpoints(edge)
                .is_some_and(|(a, b)| mol.atom(a).is_aromatic && mol.atom(b).is_aromatic);
            if both_aromatic {
                out.push('-');
            }
        }
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
    }
}

fn push_ring_label(digit: usize, out: &mut String) {
    match digit {
        0..=9 => out.push_str(&digit.to_string()),
        10..=99 => {
            out.push('%');
            out.push_str(&digit.to_string());
        }
        _ => out.push_str(&format!("%({digit})")),
    }
}

/// `@` or `@@` for a stereocenter, given the order its neighbors are
/// written in: parent, implicit hydrogen, ring bonds, children.
fn chirality_mark(mol: &Mol<Atom, Bond>, node: NodeIndex, traversal: &Traversal) -> Option<&'static str> {
    let stereo = mol.tetrahedral_stereo_for(node)?;
    let mut written = Vec::with_capacity(4);
    if let Some(parent) = traversal.parent[node.index()] {
        written.push(AtomId::Node(parent));
    }
    if mol.atom(node).hydrogen_count == 1 {
        written.push(AtomId::VirtualH(node, 0));
    }
    written.extend(traversal.rings[node.index()].iter().map(|r| AtomId::Node(r.other)));
    written.extend(traversal.children[node.index()].iter().map(|&c| AtomId::Node(c)));

    let above = stereo.above.map(|id| match id {
        AtomId::VirtualH(parent, _) if parent == node => AtomId::VirtualH(node, 0),
        other => other,
    });
    if written.len() != 4 || !above.iter().all(|id| written.contains(id)) {
        return None;
    }
    Some(if permutation_parity(&above, &written) {
        "@"
    } else {
        "@@"
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Up,
    Down,
}

impl Side {
    fn flip(self) -> Self {
        match self {
            Side::Up => Side::Down,
            Side::Down => Side::Up,
        }
    }
}

/// Marker on the tree bond between a double-bond atom and its substituent.
fn marker(side: Side, substituent_is_child: bool) -> char {
    match (side, substituent_is_child) {
        (Side::Up, true) | (Side::Down, false) => '/',
        _ => '\\',
    }
}

fn side_from_marker(marker: char, substituent_is_child: bool) -> Side {
    if (marker == '/') == substituent_is_child {
        Side::Up
    } else {
        Side::Down
    }
}

struct Candidate {
    edge: EdgeIndex,
    is_child: bool,
    side: Side,
}

fn assign_bond_directions(mol: &Mol<Atom, Bond>, traversal: &Traversal) -> HashMap<EdgeIndex, char> {
    let mut records: Vec<(usize, &EZStereo)> = mol
        .ez_stereo()
        .iter()
        .filter_map(|ez| {
            let first = traversal.position(ez.bond.0)?;
            let second = traversal.position(ez.bond.1)?;
            Some((first.min(second), ez))
        })
        .collect();
    records.sort_by_key(|&(pos, _)| pos);

    let mut directions = HashMap::new();
    for (_, ez) in records {
        match plan_directions(mol, traversal, ez, &directions) {
            Some(planned) => directions.extend(planned),
            None => debug!(
                "cannot write double-bond stereo on atoms {} and {}",
                ez.bond.0.index(),
                ez.bond.1.index()
            ),
        }
    }
    directions
}

/// Markers for one double bond, consistent with markers already placed.
fn plan_directions(
    mol: &Mol<Atom, Bond>,
    traversal: &Traversal,
    ez: &EZStereo,
    placed: &HashMap<EdgeIndex, char>,
) -> Option<Vec<(EdgeIndex, char)>> {
    let (a, b) = ez.bond;
    let double = mol.bond(mol.bond_between(a, b)?);
    if double.order != BondOrder::Double || double.is_aromatic {
        return None;
    }

    let second_side = if ez.cis { Side::Up } else { Side::Down };
    let mut ends = [(a, b, ez.refs[0], Side::Up), (b, a, ez.refs[1], second_side)];
    if traversal.position(b) < traversal.position(a) {
        ends.swap(0, 1);
    }

    let mut candidates: [Vec<Candidate>; 2] = [Vec::new(), Vec::new()];
    for (k, &(end, other, reference, ref_side)) in ends.iter().enumerate() {
        let substituents =
            mol.neighbors(end).filter(|&x| x != other).count() + usize::from(mol.atom(end).hydrogen_count);
        for x in traversal.tree_neighbors(end).filter(|&x| x != other) {
            let Some(edge) = mol.bond_between(end, x) else {
                continue;
            };
            let bond = mol.bond(edge);
            if bond.order != BondOrder::Single || bond.is_aromatic {
                continue;
            }
            let side = if reference == AtomId::Node(x) {
                ref_side
            } else if substituents == 2 {
                ref_side.flip()
            } else {
                continue;
            };
            candidates[k].push(Candidate {
                edge,
                is_child: traversal.is_child(x, end),
                side,
            });
        }
        if candidates[k].is_empty() {
            return None;
        }
    }

    let mut flip = None;
    for c in candidates.iter().flatten() {
        if let Some(&existing) = placed.get(&c.edge) {
            let needed = side_from_marker(existing, c.is_child) != c.side;
            match flip {
                None => flip = Some(needed),
                Some(f) if f != needed => return None,
                Some(_) => {}
            }
        }
    }
    let flip = match flip {
        Some(f) => f,
        None => {
            let first = &candidates[0][0];
            marker(first.side, first.is_child) != '/'
        }
    };

    let mut planned = Vec::new();
    for end in &candidates {
        if end.iter().any(|c| placed.contains_key(&c.edge)) {
            continue;
        }
        let c = &end[0];
        let side = if flip { c.side.flip() } else { c.side };
        planned.push((c.edge, marker(side, c.is_child)));
    }
    Some(planned)
}

const AROMATIC_SYMBOLS: [Element; 9] = [
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::P,
    Element::S,
    Element::Se,
    Element::As,
    Element::Te,
];

fn push_symbol(element: Option<Element>, aromatic: bool, out: &mut String) {
    match element {
        Some(e) if aromatic && AROMATIC_SYMBOLS.contains(&e) => {
            out.push_str(&e.symbol().to_ascii_lowercase())
        }
        Some(e) => out.push_str(e.symbol()),
        None => out.push('*'),
    }
}

/// Bond-order sum a SMILES reader sees for an unbracketed atom: aromatic
/// bonds count one.
fn reader_bond_sum(mol: &Mol<Atom, Bond>, node: NodeIndex) -> u8 {
    mol.bonds_of(node)
        .map(|edge| {
            let bond = mol.bond(edge);
            if bond.is_aromatic {
                1
            } else {
                bond.order.multiplicity()
            }
        })
        .fold(0u8, u8::saturating_add)
}

/// Hydrogens a reader adds to an unbracketed atom.
fn implicit_hydrogens(element: Element, aromatic: bool, bond_sum: u8) -> u8 {
    let Some(&target) = element.default_valences().iter().find(|&&v| v >= bond_sum) else {
        return 0;
    };
    let h = target - bond_sum;
    if aromatic {
        h.saturating_sub(1)
    } else {
        h
    }
}

fn write_atom(mol: &Mol<Atom, Bond>, node: NodeIndex, chirality: Option<&str>, out: &mut String) {
    let atom = mol.atom(node);
    let element = Element::from_atomic_num(atom.atomic_num);

    let bare = chirality.is_none()
        && atom.isotope == 0
        && atom.formal_charge == 0
        && atom.radical_electrons == 0
        && element.is_some_and(|e| {
            e.is_organic_subset()
                && (!atom.is_aromatic || AROMATIC_SYMBOLS.contains(&e))
                && atom.hydrogen_count == implicit_hydrogens(e, atom.is_aromatic, reader_bond_sum(mol, node))
        });
    if bare {
        push_symbol(element, atom.is_aromatic, out);
        return;
    }

    out.push('[');
    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }
    push_symbol(element, atom.is_aromatic, out);
    if let Some(mark) = chirality {
        out.push_str(mark);
    }
    match atom.hydrogen_count {
        0 => {}
        1 => out.push('H'),
        h => {
            out.push('H');
            out.push_str(&h.to_string());
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        q if q > 0 => out.push_str(&format!("+{q}")),
        q => out.push_str(&format!("-{}", q.unsigned_abs())),
    }
    out.push(']');
}
