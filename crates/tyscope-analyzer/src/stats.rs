//! Program statistics
//!
//! Counts over packages, files and exported declarations, plus a few
//! "top" lists that keep the items sharing the highest value seen so far.

use crate::declarations::{Declarations, Function};
use crate::packages::PackageInfo;
use crate::registry::TypeRegistry;
use crate::type_info::{TypeIdx, TypeKind};
use serde::Serialize;
use std::collections::BTreeMap;
use tyscope_types::{Package, RawKind};

/// Number of files-by-LOC buckets.
pub const LOC_BUCKETS: usize = 20;

/// Distributions lump every count at or above this into the last slot.
pub const DISTRIBUTION_CAP: usize = 32;

/// Bucket of a file with `lines` lines.
///
/// Hundreds below 1000, thousands below 10000, then one overflow bucket.
pub fn loc_bucket(lines: u32) -> usize {
    let lines = lines as usize;
    if lines < 1000 {
        lines / 100
    } else if lines < 10_000 {
        9 + lines / 1000
    } else {
        LOC_BUCKETS - 1
    }
}

fn bump(distribution: &mut Vec<usize>, n: usize) {
    let slot = n.min(DISTRIBUTION_CAP - 1);
    if distribution.len() <= slot {
        distribution.resize(slot + 1, 0);
    }
    distribution[slot] += 1;
}

/// Items sharing the highest value seen so far.
///
/// The threshold starts at 1 and only rises; a new maximum clears the list.
#[derive(Debug, Clone, Serialize)]
pub struct TopList {
    pub criterion: usize,
    pub items: Vec<String>,
    #[serde(skip)]
    cap: usize,
}

impl TopList {
    pub fn new(cap: usize) -> Self {
        TopList {
            criterion: 1,
            items: Vec::new(),
            cap: cap.max(1),
        }
    }

    pub fn try_to_add(&mut self, item: impl Into<String>, value: usize) {
        if value < self.criterion {
            return;
        }
        if value > self.criterion {
            self.criterion = value;
            self.items.clear();
        }
        if self.items.len() < self.cap {
            self.items.push(item.into());
        }
    }
}

impl Default for TopList {
    fn default() -> Self {
        TopList::new(8)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TopLists {
    pub packages_with_most_deps: TopList,
    pub structs_with_most_fields: TopList,
    pub types_with_most_methods: TopList,
    pub interfaces_with_most_methods: TopList,
    pub functions_with_most_params: TopList,
    pub functions_with_most_results: TopList,
}

impl TopLists {
    fn new(cap: usize) -> Self {
        TopLists {
            packages_with_most_deps: TopList::new(cap),
            structs_with_most_fields: TopList::new(cap),
            types_with_most_methods: TopList::new(cap),
            interfaces_with_most_methods: TopList::new(cap),
            functions_with_most_params: TopList::new(cap),
            functions_with_most_results: TopList::new(cap),
        }
    }
}

/// Field totals over exported structs.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct FieldTotals {
    pub explicit: usize,
    pub promoted: usize,
    pub exported: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub packages: usize,
    pub files: usize,
    pub dep_edges: usize,
    pub imports: usize,
    pub code_lines: u64,
    pub files_by_loc: [usize; LOC_BUCKETS],
    pub packages_by_dep_count: Vec<usize>,

    pub types: usize,
    pub types_by_kind: BTreeMap<&'static str, usize>,

    /// Exported named types by the kind of their underlying type
    pub exported_type_names_by_kind: BTreeMap<&'static str, usize>,
    pub exported_aliases: usize,
    pub exported_numerics: usize,
    pub exported_integers: usize,

    pub exported_structs: usize,
    pub struct_fields: FieldTotals,
    pub struct_field_distribution: Vec<usize>,

    pub exported_named_non_interfaces: usize,
    pub named_methods: usize,
    pub named_method_distribution: Vec<usize>,

    pub exported_interfaces: usize,
    pub interface_methods: usize,
    pub interface_method_distribution: Vec<usize>,

    pub exported_functions: usize,
    pub exported_methods: usize,
    pub param_distribution: Vec<usize>,
    pub result_distribution: Vec<usize>,

    pub exported_variables: usize,
    pub exported_constants: usize,

    pub top: TopLists,
}

#[derive(Debug)]
pub struct Statistician<'a> {
    registry: &'a TypeRegistry,
    decls: &'a Declarations,
    infos: &'a [PackageInfo],
    packages: &'a [Package],
    stats: Stats,
}

impl<'a> Statistician<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        decls: &'a Declarations,
        infos: &'a [PackageInfo],
        packages: &'a [Package],
        top_list_size: usize,
    ) -> Self {
        Statistician {
            registry,
            decls,
            infos,
            packages,
            stats: Stats {
                top: TopLists::new(top_list_size),
                ..Stats::default()
            },
        }
    }

    pub fn collect(mut self) -> Stats {
        self.count_packages();
        self.count_types();
        self.count_type_names();
        self.count_functions();
        self.stats.exported_variables = self.decls.variables().iter().filter(|v| v.exported).count();
        self.stats.exported_constants = self.decls.constants().iter().filter(|c| c.exported).count();
        self.stats
    }

    fn count_packages(&mut self) {
        let stats = &mut self.stats;
        stats.packages = self.infos.len();
        stats.imports = self.decls.imports().len();
        for info in self.infos {
            stats.dep_edges += info.deps.len();
            stats.code_lines += info.line_count;
            bump(&mut stats.packages_by_dep_count, info.deps.len());
            stats.top.packages_with_most_deps.try_to_add(info.path.as_str(), info.deps.len());
        }
        for file in self.packages.iter().flat_map(|p| &p.files) {
            stats.files += 1;
            stats.files_by_loc[loc_bucket(file.line_count)] += 1;
        }
    }

    fn count_types(&mut self) {
        self.stats.types = self.registry.len();
        for info in self.registry.iter() {
            *self.stats.types_by_kind.entry(info.kind.name()).or_default() += 1;
        }
    }

    fn count_type_names(&mut self) {
        let (registry, decls) = (self.registry, self.decls);
        for type_name in decls.type_names() {
            if !type_name.exported {
                continue;
            }
            if type_name.is_alias() {
                self.stats.exported_aliases += 1;
                continue;
            }

            let t = type_name.denoting;
            let display = registry.display(t);
            let info = registry.info(t);
            let underlying = registry.info(info.underlying);
            *self
                .stats
                .exported_type_names_by_kind
                .entry(underlying.kind.name())
                .or_default() += 1;

            match underlying.kind {
                TypeKind::Basic => {
                    if let Some(RawKind::Basic(basic)) = registry.universe().get(underlying.raw) {
                        if basic.is_numeric() {
                            self.stats.exported_numerics += 1;
                        }
                        if basic.is_integer() {
                            self.stats.exported_integers += 1;
                        }
                    }
                }
                TypeKind::Struct => {
                    let explicit = underlying.direct_selectors.len();
                    let promoted = info.all_fields.iter().filter(|f| f.depth > 0).count();
                    let exported = info.all_fields.iter().filter(|f| f.is_exported()).count();
                    self.stats.exported_structs += 1;
                    self.stats.struct_fields.explicit += explicit;
                    self.stats.struct_fields.promoted += promoted;
                    self.stats.struct_fields.exported += exported;
                    bump(&mut self.stats.struct_field_distribution, explicit);
                    self.stats
                        .top
                        .structs_with_most_fields
                        .try_to_add(display.as_str(), info.all_fields.len());
                }
                _ => {}
            }

            if underlying.kind == TypeKind::Interface {
                let methods = info.all_methods.len();
                self.stats.exported_interfaces += 1;
                self.stats.interface_methods += methods;
                bump(&mut self.stats.interface_method_distribution, methods);
                self.stats.top.interfaces_with_most_methods.try_to_add(display, methods);
            } else {
                let methods = self.method_count(t);
                self.stats.exported_named_non_interfaces += 1;
                self.stats.named_methods += methods;
                bump(&mut self.stats.named_method_distribution, methods);
                self.stats.top.types_with_most_methods.try_to_add(display, methods);
            }
        }
    }

    /// Methods of `t` including pointer-receiver ones.
    fn method_count(&self, t: TypeIdx) -> usize {
        let full = self.registry.pointer_of(t).unwrap_or(t);
        self.registry.info(full).all_methods.len()
    }

    fn count_functions(&mut self) {
        let decls = self.decls;
        for function in decls.functions() {
            if !function.exported {
                continue;
            }
            if function.is_method() {
                self.stats.exported_methods += 1;
            } else {
                self.stats.exported_functions += 1;
            }
            bump(&mut self.stats.param_distribution, function.param_count);
            bump(&mut self.stats.result_distribution, function.result_count);

            let name = self.function_display(function);
            self.stats
                .top
                .functions_with_most_params
                .try_to_add(name.as_str(), function.param_count);
            self.stats
                .top
                .functions_with_most_results
                .try_to_add(name, function.result_count);
        }
    }

    fn function_display(&self, function: &Function) -> String {
        match &function.receiver {
            Some(receiver) => format!("{}.{}", self.registry.display(receiver.base), function.name),
            None => {
                let package = self
                    .infos
                    .get(function.package.index())
                    .map_or("", |p| p.name.as_str());
                format!("{}.{}", package, function.name)
            }
        }
    }
}
