//! Consistency checks over collected selectors
//!
//! Verifies what the resolver promises: interface method sets have unique
//! ids, promoted selectors carry a chain exactly as long as their depth,
//! and no hidden selector survived into a final list.

use crate::registry::TypeRegistry;
use crate::selector::{ChainArena, Selector};
use crate::type_info::{TypeIdx, TypeKind};
use rustc_hash::FxHashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    DuplicateInterfaceMethod { ty: TypeIdx, selector: String },
    ChainLengthMismatch { ty: TypeIdx, selector: String, depth: u16, chain: usize },
    HiddenSelectorKept { ty: TypeIdx, selector: String },
    NotPromoted { ty: TypeIdx },
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckFailure::DuplicateInterfaceMethod { ty, selector } => {
                write!(f, "{}: method {} listed twice", ty, selector)
            }
            CheckFailure::ChainLengthMismatch {
                ty,
                selector,
                depth,
                chain,
            } => write!(f, "{}: selector {} at depth {} has chain of {}", ty, selector, depth, chain),
            CheckFailure::HiddenSelectorKept { ty, selector } => {
                write!(f, "{}: hidden selector {} kept", ty, selector)
            }
            CheckFailure::NotPromoted { ty } => write!(f, "{}: selectors never promoted", ty),
        }
    }
}

/// Run every check, returning the failures found.
pub fn check_collected_selectors(registry: &TypeRegistry, chains: &ChainArena) -> Vec<CheckFailure> {
    let mut failures = Vec::new();
    for info in registry.iter() {
        let ty = info.index;
        if !info.promoted_selectors_collected() {
            failures.push(CheckFailure::NotPromoted { ty });
            continue;
        }

        if info.kind == TypeKind::Interface {
            let mut seen = FxHashSet::default();
            for method in &info.all_methods {
                if !seen.insert(&method.id) {
                    failures.push(CheckFailure::DuplicateInterfaceMethod {
                        ty,
                        selector: method.id.to_string(),
                    });
                }
            }
        }

        for selector in info.all_fields.iter().chain(&info.all_methods) {
            check_selector(ty, selector, chains, &mut failures);
        }
    }
    failures
}

fn check_selector(ty: TypeIdx, selector: &Selector, chains: &ChainArena, failures: &mut Vec<CheckFailure>) {
    let chain = chains.len(selector.chain);
    let consistent = match selector.chain {
        None => selector.depth == 0,
        Some(_) => chain == usize::from(selector.depth),
    };
    if !consistent {
        failures.push(CheckFailure::ChainLengthMismatch {
            ty,
            selector: selector.id.to_string(),
            depth: selector.depth,
            chain,
        });
    }
    if selector.is_hidden() {
        failures.push(CheckFailure::HiddenSelectorKept {
            ty,
            selector: selector.id.to_string(),
        });
    }
}
