//! Analyzer facade
//!
//! Owns the input program and every arena the phases fill, runs the
//! pipeline in order, and answers queries over the results.

use crate::check::{check_collected_selectors, CheckFailure};
use crate::collector::DeclarationCollector;
use crate::config::AnalyzerConfig;
use crate::declarations::{
    Constant, ConstantId, DeclPos, Declarations, Function, FunctionId, Import, ImportId, TypeName,
    TypeNameId, Variable, VariableId,
};
use crate::error::{AnalysisError, SelectorConflict};
use crate::generics::TypeSourceFinder;
use crate::implementations::{register_interface_methods, ImplementationFinder};
use crate::packages::{PackageGraph, PackageIdx, PackageInfo, RuntimeFunction, RuntimePositions, SourceFile};
use crate::progress::{ProgressReporter, SubTask, SubTaskCallback};
use crate::registry::TypeRegistry;
use crate::selector::{ChainArena, Field, Selector, SelectorId};
use crate::selectors::SelectorResolver;
use crate::stats::{Statistician, Stats};
use crate::type_info::{TypeIdx, TypeInfo};
use rustc_hash::FxHashMap;
use tyscope_types::{Package, Program, RawType, ToolchainInfo};

fn phase(task: SubTask) -> tracing::span::EnteredSpan {
    tracing::info_span!("phase", task = task.name()).entered()
}

/// Whole-program analyzer.
///
/// # Example.
///
/// ```ignore
/// let mut analyzer = Analyzer::new(program, AnalyzerConfig::default());
/// analyzer.analyze()?;
/// let stringer = analyzer.lookup_type(stringer_raw).unwrap();
/// for t in analyzer.implementers_of(stringer) {
///     println!("{}", analyzer.type_display(t));
/// }
/// ```
#[derive(Debug)]
pub struct Analyzer {
    config: AnalyzerConfig,
    toolchain: ToolchainInfo,
    packages: Vec<Package>,

    registry: TypeRegistry,
    decls: Declarations,
    chains: ChainArena,

    infos: Vec<PackageInfo>,
    /// Package indices, dependencies first
    sorted: Vec<PackageIdx>,
    package_lookup: FxHashMap<String, PackageIdx>,
    source_files: FxHashMap<String, SourceFile>,
    runtime_positions: RuntimePositions,

    conflicts: Vec<SelectorConflict>,
    check_failures: Vec<CheckFailure>,
    stats: Option<Stats>,

    progress: ProgressReporter,
    analyzed: bool,
}

impl Analyzer {
    pub fn new(program: Program, config: AnalyzerConfig) -> Self {
        Analyzer {
            config,
            toolchain: program.toolchain,
            packages: program.packages,
            registry: TypeRegistry::new(program.universe),
            decls: Declarations::new(),
            chains: ChainArena::new(),
            infos: Vec::new(),
            sorted: Vec::new(),
            package_lookup: FxHashMap::default(),
            source_files: FxHashMap::default(),
            runtime_positions: RuntimePositions::default(),
            conflicts: Vec::new(),
            check_failures: Vec::new(),
            stats: None,
            progress: ProgressReporter::new(),
            analyzed: false,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn toolchain(&self) -> &ToolchainInfo {
        &self.toolchain
    }

    /// Run every phase.
    ///
    /// On failure all results are dropped; the analyzer can be run again.
    pub fn analyze(&mut self) -> Result<(), AnalysisError> {
        let _span = tracing::info_span!("analyze", packages = self.packages.len()).entered();
        if self.analyzed {
            self.clear();
        }
        self.progress.restart();

        match self.run_phases() {
            Ok(()) => {
                self.analyzed = true;
                tracing::info!(
                    types = self.registry.len(),
                    conflicts = self.conflicts.len(),
                    "analysis complete"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "analysis failed");
                self.clear();
                Err(err)
            }
        }
    }

    fn clear(&mut self) {
        self.registry.reset();
        self.decls.clear();
        self.chains.clear();
        self.infos.clear();
        self.sorted.clear();
        self.package_lookup.clear();
        self.source_files.clear();
        self.runtime_positions.clear();
        self.conflicts.clear();
        self.check_failures.clear();
        self.stats = None;
        self.analyzed = false;
    }

    fn run_phases(&mut self) -> Result<(), AnalysisError> {
        let graph = {
            let _phase = phase(SubTask::CollectPackages);
            self.collect_packages()?
        };
        self.progress.done(SubTask::CollectPackages, &[self.infos.len() as i32]);

        {
            let _phase = phase(SubTask::SortPackagesByDependencies);
            self.sorted = graph.topological_sort()?;
        }
        self.progress.done(SubTask::SortPackagesByDependencies, &[]);

        {
            let _phase = phase(SubTask::CollectDeclarations);
            let mut collector = DeclarationCollector::new(&mut self.registry, &mut self.decls, &mut self.infos);
            for &idx in &self.sorted {
                collector.collect_package(idx, &self.packages[idx.index()])?;
            }
            collector.finish();
        }
        self.progress.done(
            SubTask::CollectDeclarations,
            &[self.registry.len() as i32, self.decls.functions().len() as i32],
        );

        {
            let _phase = phase(SubTask::CollectRuntimeFunctionPositions);
            self.collect_runtime_positions();
        }
        self.progress.done(
            SubTask::CollectRuntimeFunctionPositions,
            &[self.runtime_positions.len() as i32],
        );

        let derived = {
            let _phase = phase(SubTask::FindTypeSources);
            TypeSourceFinder::new(&mut self.registry, &self.decls, &self.package_lookup)
                .run(self.toolchain.supports_generics())?
        };
        self.progress.done(SubTask::FindTypeSources, &[derived as i32]);

        {
            let _phase = phase(SubTask::CollectSelectors);
            self.conflicts = SelectorResolver::new(&mut self.registry, &mut self.chains).run();
        }
        self.progress.done(SubTask::CollectSelectors, &[self.conflicts.len() as i32]);

        if self.config.check_collected_selectors {
            {
                let _phase = phase(SubTask::CheckCollectedSelectors);
                self.check_failures = check_collected_selectors(&self.registry, &self.chains);
                for failure in &self.check_failures {
                    tracing::error!(%failure, "selector check failed");
                }
            }
            self.progress.done(
                SubTask::CheckCollectedSelectors,
                &[self.check_failures.len() as i32],
            );
        }

        let implementations = {
            let _phase = phase(SubTask::FindImplementations);
            ImplementationFinder::new(&mut self.registry, &self.config).run()?
        };
        self.progress.done(SubTask::FindImplementations, &[implementations as i32]);

        let links = {
            let _phase = phase(SubTask::RegisterInterfaceMethodsForTypes);
            register_interface_methods(&mut self.registry)
        };
        self.progress.done(SubTask::RegisterInterfaceMethodsForTypes, &[links as i32]);

        {
            let _phase = phase(SubTask::MakeStatistics);
            let stats = Statistician::new(
                &self.registry,
                &self.decls,
                &self.infos,
                &self.packages,
                self.config.top_list_size,
            )
            .collect();
            self.stats = Some(stats);
        }
        self.progress.done(SubTask::MakeStatistics, &[]);

        {
            let _phase = phase(SubTask::CollectSourceFiles);
            self.collect_source_files();
        }
        self.progress.done(SubTask::CollectSourceFiles, &[self.source_files.len() as i32]);
        Ok(())
    }

    fn collect_packages(&mut self) -> Result<PackageGraph, AnalysisError> {
        let graph = PackageGraph::from_packages(&self.packages)?;
        self.infos = self
            .packages
            .iter()
            .enumerate()
            .map(|(i, package)| {
                let idx = PackageIdx(i as u32);
                let mut info = PackageInfo::new(idx, package);
                info.deps = graph
                    .dependencies(idx)
                    .iter()
                    .map(|&d| PackageIdx(d as u32))
                    .collect();
                info
            })
            .collect();
        self.package_lookup = self
            .infos
            .iter()
            .map(|info| (info.path.clone(), info.index))
            .collect();
        tracing::debug!(packages = self.infos.len(), "packages collected");
        Ok(graph)
    }

    fn collect_runtime_positions(&mut self) {
        let Some(&runtime) = self.package_lookup.get(&self.config.runtime_package) else {
            return;
        };
        for &id in &self.infos[runtime.index()].functions {
            let Some(function) = self.decls.function(id) else {
                continue;
            };
            if function.is_method() {
                continue;
            }
            if let Ok(helper) = function.name.parse::<RuntimeFunction>() {
                self.runtime_positions.insert(helper, function.position);
            }
        }
    }

    fn collect_source_files(&mut self) {
        for (i, package) in self.packages.iter().enumerate() {
            for file in &package.files {
                self.source_files.insert(
                    file.path.clone(),
                    SourceFile {
                        package: PackageIdx(i as u32),
                        generated_from: file.generated_from.clone(),
                        lines: file.line_count,
                    },
                );
            }
        }
    }

    // ============================================================================
    // Types
    // ============================================================================

    /// Register a raw type, returning its record index.
    ///
    /// Registering a type the analysis already saw changes nothing. Types
    /// first registered after analysis carry no selectors.
    pub fn register_type(&mut self, raw: RawType) -> TypeIdx {
        self.registry.register(raw)
    }

    pub fn lookup_type(&self, raw: RawType) -> Option<TypeIdx> {
        self.registry.lookup(raw)
    }

    pub fn type_info(&self, idx: TypeIdx) -> Option<&TypeInfo> {
        self.registry.get(idx)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn type_display(&self, idx: TypeIdx) -> String {
        self.registry.display(idx)
    }

    // ============================================================================
    // Declarations
    // ============================================================================

    pub fn declarations(&self) -> &Declarations {
        &self.decls
    }

    pub fn type_name(&self, id: TypeNameId) -> Option<&TypeName> {
        self.decls.type_name(id)
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.decls.function(id)
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.decls.variable(id)
    }

    pub fn constant(&self, id: ConstantId) -> Option<&Constant> {
        self.decls.constant(id)
    }

    pub fn import(&self, id: ImportId) -> Option<&Import> {
        self.decls.import(id)
    }

    // ============================================================================
    // Packages
    // ============================================================================

    pub fn package_by_path(&self, path: &str) -> Option<&Package> {
        let idx = self.package_lookup.get(path)?;
        self.packages.get(idx.index())
    }

    pub fn package_index(&self, path: &str) -> Option<PackageIdx> {
        self.package_lookup.get(path).copied()
    }

    pub fn num_packages(&self) -> usize {
        self.sorted.len()
    }

    /// Package at position `i` in dependency order.
    pub fn package_at(&self, i: usize) -> Option<&PackageInfo> {
        let idx = self.sorted.get(i)?;
        self.infos.get(idx.index())
    }

    pub fn package_info(&self, idx: PackageIdx) -> Option<&PackageInfo> {
        self.infos.get(idx.index())
    }

    pub fn source_file_to_package(&self, path: &str) -> Option<&PackageInfo> {
        let file = self.source_files.get(path)?;
        self.infos.get(file.package.index())
    }

    /// File a generated file was produced from, or the file itself.
    pub fn original_source_file<'s>(&'s self, path: &'s str) -> Option<&'s str> {
        let file = self.source_files.get(path)?;
        Some(file.generated_from.as_deref().unwrap_or(path))
    }

    pub fn source_file(&self, path: &str) -> Option<&SourceFile> {
        self.source_files.get(path)
    }

    /// Position of a tracked runtime helper such as `gopanic`.
    pub fn runtime_function_position(&self, name: &str) -> Option<&DeclPos> {
        let helper = name.parse::<RuntimeFunction>().ok()?;
        self.runtime_positions.get(&helper)
    }

    pub fn statistics(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    // ============================================================================
    // Selectors and implementations
    // ============================================================================

    /// Embedded fields a selector is reached through, outermost first.
    pub fn selector_chain(&self, selector: &Selector) -> Vec<&Field> {
        self.chains.fields_forward(selector.chain)
    }

    /// Concrete types implementing an interface.
    ///
    /// Every non-interface type implements an interface without methods.
    /// Interfaces are never listed; ask [`Self::implements_interface`].
    pub fn implementers_of(&self, interface: TypeIdx) -> Vec<TypeIdx> {
        if !self.registry.is_interface(interface) {
            return Vec::new();
        }
        let Some(info) = self.registry.get(interface) else {
            return Vec::new();
        };
        let underlying = self.registry.info(info.underlying);
        if underlying.all_methods.is_empty() {
            return self
                .registry
                .iter()
                .filter(|t| !self.registry.is_interface(t.index))
                .map(|t| t.index)
                .collect();
        }
        underlying.implemented_by.clone()
    }

    /// Whether `t` implements `interface`.
    ///
    /// An interface implements another one whose method set its own
    /// includes, and every type implements an interface without methods.
    /// No interface implements itself.
    pub fn implements_interface(&self, t: TypeIdx, interface: TypeIdx) -> bool {
        if !self.registry.is_interface(interface) {
            return false;
        }
        let (Some(info), Some(t_info)) = (self.registry.get(interface), self.registry.get(t)) else {
            return false;
        };
        let underlying = info.underlying;
        if self.registry.is_interface(t) && t_info.underlying == underlying {
            return false;
        }
        if self.registry.info(underlying).all_methods.is_empty() {
            return true;
        }
        t_info
            .implements
            .iter()
            .any(|imp| self.registry.info(imp.interface).underlying == underlying)
    }

    /// Interfaces whose method `method` is implemented by `t`'s method.
    pub fn interface_methods_implemented_by(&self, t: TypeIdx, method: &SelectorId) -> &[TypeIdx] {
        self.registry
            .get(t)
            .and_then(|info| info.interface_methods.get(method))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Selector conflicts found during resolution.
    pub fn conflicts(&self) -> &[SelectorConflict] {
        &self.conflicts
    }

    /// Failures of the selector consistency checks.
    pub fn check_failures(&self) -> &[CheckFailure] {
        &self.check_failures
    }

    // ============================================================================
    // Progress
    // ============================================================================

    pub fn set_subtask_callback(&mut self, callback: SubTaskCallback) {
        self.progress.set_callback(callback);
    }

    /// Report a phase run outside the analyzer, such as parsing.
    pub fn report_subtask(&mut self, task: SubTask, extras: &[i32]) {
        self.progress.done(task, extras);
    }
}
