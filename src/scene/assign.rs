//! Partitioned material assignment: one walk over the hierarchy, subject
//! material where the name predicate matches, environment material
//! everywhere else.

use crate::asset::Handle;
use crate::material::StageMaterial;
use crate::scene::components::{Children, MaterialComponent, Name};

/// Counts reported by [`assign_materials`] for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignReport {
    pub matched: usize,
    pub visited: usize,
}

/// Walk every node under `roots` exactly once and attach a material
/// component: `subject` where `predicate(name)` holds, `environment`
/// otherwise. Nodes without a name are treated as non-matching. Nothing
/// else on the node is touched.
pub fn assign_materials<F>(
    world: &mut hecs::World,
    roots: &[hecs::Entity],
    predicate: F,
    subject: Handle<StageMaterial>,
    environment: Handle<StageMaterial>,
) -> AssignReport
where
    F: Fn(&str) -> bool,
{
    let mut report = AssignReport {
        matched: 0,
        visited: 0,
    };

    let mut stack: Vec<hecs::Entity> = roots.to_vec();

    while let Some(entity) = stack.pop() {
        report.visited += 1;

        let is_subject = world
            .get::<&Name>(entity)
            .map(|name| predicate(&name.0))
            .unwrap_or(false);

        let material = if is_subject {
            report.matched += 1;
            subject
        } else {
            environment
        };

        let replaced = {
            if let Ok(mut component) = world.get::<&mut MaterialComponent>(entity) {
                component.0 = material;
                true
            } else {
                false
            }
        };
        if !replaced {
            world.insert_one(entity, MaterialComponent(material)).ok();
        }

        if let Ok(children) = world.get::<&Children>(entity) {
            stack.extend(children.0.iter().copied());
        }
    }

    report
}

/// The predicate the stage uses: case-sensitive substring match against a
/// fixed marker token in the node name.
pub fn marker_predicate(marker: &str) -> impl Fn(&str) -> bool + '_ {
    move |name: &str| name.contains(marker)
}
