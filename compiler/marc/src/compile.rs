//! Compilation of one manifest, and of many in parallel.

use std::io;
use std::sync::Arc;

use mar_diagnostic::emitter::DiagnosticEmitter;
use mar_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use mar_eval::errors::internal;
use mar_eval::{Catalog, EvalSettings, EvaluationContext, MemoryCatalog, ResourceKey};
use mar_ir::{Location, Position, SyntaxTree};
use rayon::prelude::*;

/// Outcome of a compilation.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CompileStatus {
    Succeeded,
    /// At least one error was reported.
    Failed(ErrorGuaranteed),
}

/// Everything a compilation produced, including a partial catalog when it
/// failed.
#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub path: Arc<str>,
    pub catalog: MemoryCatalog,
    pub diagnostics: DiagnosticQueue,
    pub status: CompileStatus,
}

impl CompileOutput {
    pub fn is_success(&self) -> bool {
        self.status == CompileStatus::Succeeded
    }

    /// Process exit code: `0` on success, `1` on failure.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            CompileStatus::Succeeded => 0,
            CompileStatus::Failed(_) => 1,
        }
    }

    /// Write every recorded diagnostic, then the summary line.
    pub fn emit(&self, emitter: &mut impl DiagnosticEmitter) -> io::Result<()> {
        emitter.emit_all(self.diagnostics.diagnostics())?;
        emitter.emit_summary(self.diagnostics.error_count())?;
        emitter.flush()
    }
}

/// Compile one manifest into a fresh catalog.
#[tracing::instrument(level = "debug", skip_all, fields(path = %tree.path))]
pub fn compile(tree: &SyntaxTree, settings: &EvalSettings) -> CompileOutput {
    let mut catalog = MemoryCatalog::new();
    let mut context = EvaluationContext::new(&mut catalog, settings.clone());
    let status = match run(&mut context, tree) {
        Ok(()) => CompileStatus::Succeeded,
        Err(guarantee) => CompileStatus::Failed(guarantee),
    };
    let diagnostics = context.into_diagnostics();
    tracing::debug!(
        resources = catalog.len(),
        errors = diagnostics.error_count(),
        "compiled"
    );

    CompileOutput {
        path: tree.path.clone(),
        catalog,
        diagnostics,
        status,
    }
}

fn run(context: &mut EvaluationContext<'_>, tree: &SyntaxTree) -> Result<(), ErrorGuaranteed> {
    let main = Location::new(tree.path.clone(), Position::DUMMY);
    if context
        .catalog_mut()
        .add_resource(ResourceKey::class("main"), main.clone(), false)
        .is_none()
    {
        return Err(context.report(&internal("Class[main] is already in the catalog").at(main)));
    }

    // Pass 1: definitions, so classes can be declared before they are written.
    if let Err(error) = context.register_definitions(&tree.statements, &tree.path, None) {
        return Err(context.report(&error));
    }

    // Pass 2: statements in order; the first error halts.
    let evaluated = context.with_unit(tree.path.clone(), |context| {
        context.evaluate_statements(&tree.statements)
    });
    if let Err(error) = evaluated {
        return Err(context.report(&error));
    }

    // `err()` records errors without halting.
    match ErrorGuaranteed::from_error_count(context.diagnostics().error_count()) {
        Some(guarantee) => Err(guarantee),
        None => Ok(()),
    }
}

/// Worker stack size for parallel compilation. Evaluation recursion grows
/// the stack on demand; a larger start reduces how often it has to.
const WORKER_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Compile independent manifests in parallel. Outputs are in input order.
pub fn compile_all(trees: &[SyntaxTree], settings: &EvalSettings) -> Vec<CompileOutput> {
    rayon::ThreadPoolBuilder::new()
        .stack_size(WORKER_STACK_SIZE)
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| {
                trees
                    .par_iter()
                    .map(|tree| compile(tree, settings))
                    .collect::<Vec<_>>()
            })
        })
        .unwrap_or_else(|e| {
            tracing::warn!("failed to create thread pool ({e}), compiling sequentially");
            trees.iter().map(|tree| compile(tree, settings)).collect()
        })
}

#[cfg(test)]
mod tests;
