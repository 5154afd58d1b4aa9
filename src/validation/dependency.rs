//! Composite dependency resolution and cycle detection.

use std::collections::HashSet;

/// Abstracts over "what names exist and what do they depend on" so this
/// module can validate composites without importing [`crate::composition`]
/// directly (the composition registry is the caller of these functions).
pub trait DependencyResolver {
    /// True if `name` is a known primitive construct or already-registered
    /// composite.
    fn is_registered(&self, name: &str) -> bool;

    /// The component names `name` depends on. Empty for primitive
    /// constructs, which have no further dependencies.
    fn dependencies_of(&self, name: &str) -> Vec<String>;
}

/// Checks that every component a candidate composite names (transitively)
/// resolves to a registered primitive or composite.
///
/// Returns the name of the first unresolved dependency encountered, if any.
pub fn validate_dependencies<R: DependencyResolver>(
    resolver: &R,
    components: &[String],
) -> Option<String> {
    let mut seen = HashSet::new();
    let mut stack: Vec<String> = components.to_vec();
    while let Some(name) = stack.pop() {
        if !seen.insert(name.clone()) {
            continue;
        }
        if !resolver.is_registered(&name) {
            return Some(name);
        }
        stack.extend(resolver.dependencies_of(&name));
    }
    None
}

/// Depth-first cycle detection over the dependency graph rooted at
/// `components`, as they would exist once `new_name` is registered with
/// those components.
///
/// Returns the cycle as a path of names (first and last equal) if one
/// exists.
pub fn detect_cycles<R: DependencyResolver>(
    resolver: &R,
    new_name: &str,
    components: &[String],
) -> Option<Vec<String>> {
    fn visit<R: DependencyResolver>(
        resolver: &R,
        node: &str,
        deps: &[String],
        path: &mut Vec<String>,
        on_stack: &mut HashSet<String>,
    ) -> Option<Vec<String>> {
        path.push(node.to_string());
        on_stack.insert(node.to_string());

        for dep in deps {
            if on_stack.contains(dep) {
                let mut cycle = path.clone();
                cycle.push(dep.clone());
                return Some(cycle);
            }
            let dep_deps = resolver.dependencies_of(dep);
            if let Some(cycle) = visit(resolver, dep, &dep_deps, path, on_stack) {
                return Some(cycle);
            }
        }

        path.pop();
        on_stack.remove(node);
        None
    }

    let mut path = Vec::new();
    let mut on_stack = HashSet::new();
    visit(resolver, new_name, components, &mut path, &mut on_stack)
}
