//! Package bookkeeping and dependency ordering
//!
//! Tracks package dependencies, detects import cycles, and orders packages
//! so that every package is processed after the packages it imports.

use crate::declarations::{ConstantId, DeclPos, FunctionId, ImportId, TypeNameId, VariableId};
use crate::error::AnalysisError;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tyscope_types::{Package, UNSAFE_PACKAGE};

/// Index of a package in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageIdx(pub(crate) u32);

impl PackageIdx {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-package analysis results.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub index: PackageIdx,
    pub path: String,
    pub name: String,
    /// Resolved dependencies; the absent `unsafe` package is left out
    pub deps: Vec<PackageIdx>,
    pub type_names: Vec<TypeNameId>,
    pub functions: Vec<FunctionId>,
    pub variables: Vec<VariableId>,
    pub constants: Vec<ConstantId>,
    pub imports: Vec<ImportId>,
    pub line_count: u64,
}

impl PackageInfo {
    pub fn new(index: PackageIdx, package: &Package) -> Self {
        PackageInfo {
            index,
            path: package.path.clone(),
            name: package.name.clone(),
            deps: Vec::new(),
            type_names: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
            constants: Vec::new(),
            imports: Vec::new(),
            line_count: package.files.iter().map(|f| u64::from(f.line_count)).sum(),
        }
    }
}

/// Dependency graph over the loaded packages.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    /// Adjacency list: package -> packages it imports, in input order
    edges: Vec<Vec<usize>>,
    paths: Vec<String>,
}

impl PackageGraph {
    /// Build the graph from package import lists.
    ///
    /// A dependency on `unsafe` that is not among the packages is ignored;
    /// any other missing dependency is an error.
    pub fn from_packages(packages: &[Package]) -> Result<Self, AnalysisError> {
        let lookup: FxHashMap<&str, usize> = packages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.path.as_str(), i))
            .collect();

        let mut edges = Vec::with_capacity(packages.len());
        for package in packages {
            let mut deps = Vec::with_capacity(package.deps.len());
            for dep in &package.deps {
                match lookup.get(dep.as_str()) {
                    Some(&idx) => {
                        if !deps.contains(&idx) {
                            deps.push(idx);
                        }
                    }
                    None if dep == UNSAFE_PACKAGE => {}
                    None => {
                        return Err(AnalysisError::UnknownDependency {
                            package: package.path.clone(),
                            dependency: dep.clone(),
                        })
                    }
                }
            }
            edges.push(deps);
        }

        Ok(PackageGraph {
            edges,
            paths: packages.iter().map(|p| p.path.clone()).collect(),
        })
    }

    /// Dependencies of a package.
    pub fn dependencies(&self, idx: PackageIdx) -> &[usize] {
        self.edges.get(idx.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Detect a cycle, returned as the package paths along it.
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        let mut visited = vec![false; self.edges.len()];
        let mut on_stack = vec![false; self.edges.len()];
        let mut path = Vec::new();

        for node in 0..self.edges.len() {
            if !visited[node] {
                if let Some(cycle) = self.dfs_cycle(node, &mut visited, &mut on_stack, &mut path) {
                    return Some(cycle.into_iter().map(|i| self.paths[i].clone()).collect());
                }
            }
        }
        None
    }

    fn dfs_cycle(
        &self,
        node: usize,
        visited: &mut [bool],
        on_stack: &mut [bool],
        path: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        visited[node] = true;
        on_stack[node] = true;
        path.push(node);

        for &next in &self.edges[node] {
            if !visited[next] {
                if let Some(cycle) = self.dfs_cycle(next, visited, on_stack, path) {
                    return Some(cycle);
                }
            } else if on_stack[next] {
                let start = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
        }

        on_stack[node] = false;
        path.pop();
        None
    }

    /// Order packages so dependencies come before dependents.
    ///
    /// Among packages that are ready at the same time, input order wins, so
    /// the result is reproducible.
    pub fn topological_sort(&self) -> Result<Vec<PackageIdx>, AnalysisError> {
        if let Some(cycle) = self.detect_cycle() {
            return Err(AnalysisError::ImportCycle {
                cycle: cycle.join(" -> "),
            });
        }

        // Kahn's algorithm over the reversed edges
        let mut pending: Vec<usize> = self.edges.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.edges.len()];
        for (node, deps) in self.edges.iter().enumerate() {
            for &dep in deps {
                dependents[dep].push(node);
            }
        }

        let mut ready: BTreeSet<usize> = pending
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == 0)
            .map(|(node, _)| node)
            .collect();
        let mut order = Vec::with_capacity(self.edges.len());

        while let Some(node) = ready.pop_first() {
            order.push(PackageIdx(node as u32));
            for &dependent in &dependents[node] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        Ok(order)
    }
}

/// A source file and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub package: PackageIdx,
    /// File this one was generated from
    pub generated_from: Option<String>,
    pub lines: u32,
}

/// Runtime helpers whose positions are of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuntimeFunction {
    SelectGo,
    SelectNbSend,
    SelectNbRecv,
    SelectNbRecv2,
    ChanSend,
    ChanRecv1,
    ChanRecv2,
    GoPanic,
    GoRecover,
}

impl RuntimeFunction {
    pub const ALL: [RuntimeFunction; 9] = [
        RuntimeFunction::SelectGo,
        RuntimeFunction::SelectNbSend,
        RuntimeFunction::SelectNbRecv,
        RuntimeFunction::SelectNbRecv2,
        RuntimeFunction::ChanSend,
        RuntimeFunction::ChanRecv1,
        RuntimeFunction::ChanRecv2,
        RuntimeFunction::GoPanic,
        RuntimeFunction::GoRecover,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuntimeFunction::SelectGo => "selectgo",
            RuntimeFunction::SelectNbSend => "selectnbsend",
            RuntimeFunction::SelectNbRecv => "selectnbrecv",
            RuntimeFunction::SelectNbRecv2 => "selectnbrecv2",
            RuntimeFunction::ChanSend => "chansend",
            RuntimeFunction::ChanRecv1 => "chanrecv1",
            RuntimeFunction::ChanRecv2 => "chanrecv2",
            RuntimeFunction::GoPanic => "gopanic",
            RuntimeFunction::GoRecover => "gorecover",
        }
    }
}

impl FromStr for RuntimeFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuntimeFunction::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("Not a tracked runtime function: {}", s))
    }
}

impl fmt::Display for RuntimeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of a tracked runtime function.
pub type RuntimePositions = FxHashMap<RuntimeFunction, DeclPos>;
