use bevy::{
    asset::RenderAssetUsages,
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future},
};
use tracing::{debug, warn};

use crate::{
    cache::{DEFAULT_CACHE_CAPACITY, ExpressionCache},
    mesh::SurfaceMesh,
    plot::{GeneratedSurface, SurfacePlot},
};

/// System sets for the surface plot pipeline.
///
/// Use these to order your own systems relative to mesh generation:
///
/// ```rust,ignore
/// // Read bounds for a legend after geometry is ready but before it's uploaded:
/// app.add_systems(Update, update_legend.after(SurfacePlotSet::Generate)
///                                      .before(SurfacePlotSet::Upload));
/// ```
///
/// ```text
/// SurfacePlotSet::Queue → SurfacePlotSet::Spawn → [async compute] → SurfacePlotSet::Generate → [your systems] → SurfacePlotSet::Upload
/// ```
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SurfacePlotSet {
    /// Marks new or changed [`SurfacePlot`]s for rebuilding.
    Queue,
    /// Parses expressions and spawns an async compute task for each queued plot.
    Spawn,
    /// Polls async tasks and inserts [`GeneratedSurface`] on completion.
    Generate,
    /// Uploads [`GeneratedSurface`] data into Bevy [`Mesh3d`]s and removes [`GeneratedSurface`].
    Upload,
}

/// Marker component added to [`SurfacePlot`] entities that are waiting to be built.
///
/// Removed once the plot's mesh has been uploaded or its expression failed to parse.
#[derive(Component)]
pub struct QueuedSurface;

/// Holds the in-flight async compute task for a [`SurfacePlot`].
///
/// Dropping it cancels the build, which is what happens when the plot changes again
/// before the task finishes.
#[derive(Component)]
pub struct ComputeTask(Task<GeneratedSurface>);

/// The plot inputs the current mesh was built from.
///
/// A changed [`SurfacePlot`] that still compares equal to this is not rebuilt.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BuiltFrom(pub SurfacePlot);

/// Why the last build of a plot did not happen. Removed by the next successful build.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct SurfacePlotError(pub String);

/// Marks the child entity holding a plot's wireframe line mesh.
///
/// The overlay only carries a [`Mesh3d`]; give it a material to make it visible.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireframeOverlay {
    pub plot: Entity,
}

/// Tracks the overlay child spawned for a plot so it can be replaced on rebuild.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayEntity(pub Entity);

/// Runtime configuration for the surface plot pipeline.
///
/// Inserted as a resource by [`SurfacePlotPlugin`]. Modify it at any time to change behaviour:
///
/// ```rust,ignore
/// app.add_plugins(SurfacePlotPlugin { max_tasks_per_frame: 8, ..default() });
///
/// // Or change it at runtime:
/// fn my_system(mut config: ResMut<SurfacePlotConfig>) {
///     config.max_tasks_per_frame = 1;
/// }
/// ```
#[derive(Resource)]
pub struct SurfacePlotConfig {
    /// Maximum number of async mesh tasks spawned per frame.
    ///
    /// High resolutions are `O(r²)` each; spreading them over frames avoids hitches
    /// when many plots change at once. Default: `4`.
    pub max_tasks_per_frame: usize,
}

impl Default for SurfacePlotConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: 4,
        }
    }
}

/// Bevy plugin that turns [`SurfacePlot`] components into meshes.
///
/// When the `auto_queue` feature is enabled, any added or changed [`SurfacePlot`] is
/// automatically (re)built. Mesh generation runs on Bevy's `AsyncComputeTaskPool`
/// so the main thread is never blocked:
///
/// ```text
/// SurfacePlot added / changed
///   → QueuedSurface inserted        (SurfacePlotSet::Queue, skipped if equal to BuiltFrom)
///   → expression parsed (cached)    (SurfacePlotSet::Spawn; on error SurfacePlotError inserted)
///   → ComputeTask spawned
///   → [async compute runs]
///   → GeneratedSurface inserted     (SurfacePlotSet::Generate, once task completes)
///   → [your systems here]
///   → Mesh3d inserted               (SurfacePlotSet::Upload, plus a WireframeOverlay child)
///   → QueuedSurface + GeneratedSurface removed, BuiltFrom updated
/// ```
pub struct SurfacePlotPlugin {
    /// Initial value for [`SurfacePlotConfig::max_tasks_per_frame`].
    pub max_tasks_per_frame: usize,
    /// Number of parsed expressions the shared [`ExpressionCache`] keeps.
    pub cache_capacity: usize,
}

impl Default for SurfacePlotPlugin {
    fn default() -> Self {
        Self {
            max_tasks_per_frame: SurfacePlotConfig::default().max_tasks_per_frame,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Plugin for SurfacePlotPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SurfacePlotConfig {
            max_tasks_per_frame: self.max_tasks_per_frame,
        })
        .insert_resource(ExpressionCache::with_capacity(self.cache_capacity));

        #[cfg(feature = "auto_queue")]
        app.configure_sets(
            Update,
            (
                SurfacePlotSet::Queue,
                SurfacePlotSet::Spawn,
                SurfacePlotSet::Generate,
                SurfacePlotSet::Upload,
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                queue_changed_plots.in_set(SurfacePlotSet::Queue),
                spawn_surface_tasks.in_set(SurfacePlotSet::Spawn),
                poll_surface_tasks.in_set(SurfacePlotSet::Generate),
                upload_surface.in_set(SurfacePlotSet::Upload),
            ),
        );
    }
}

/// Queues every added or changed [`SurfacePlot`] whose inputs differ from the last build.
///
/// Any in-flight task for the plot is dropped so the newest inputs win.
pub fn queue_changed_plots(
    mut commands: Commands,
    query: Query<(Entity, &SurfacePlot, Option<&BuiltFrom>), Changed<SurfacePlot>>,
) {
    for (entity, plot, built) in query.iter() {
        if built.is_some_and(|b| b.0 == *plot) {
            // Changed back to what is already on screen.
            commands
                .entity(entity)
                .remove::<(QueuedSurface, ComputeTask, GeneratedSurface, SurfacePlotError)>();
            continue;
        }
        commands
            .entity(entity)
            .insert(QueuedSurface)
            .remove::<(ComputeTask, GeneratedSurface)>();
    }
}

/// Spawns async compute tasks for [`QueuedSurface`]s, up to [`SurfacePlotConfig::max_tasks_per_frame`] per frame.
///
/// Expressions are parsed here, on the main thread, through the shared [`ExpressionCache`].
/// A parse failure is logged and recorded as [`SurfacePlotError`]; the previous mesh, if any,
/// stays in place.
pub fn spawn_surface_tasks(
    mut commands: Commands,
    config: Res<SurfacePlotConfig>,
    mut cache: ResMut<ExpressionCache>,
    query: Query<(Entity, &SurfacePlot), (With<QueuedSurface>, Without<ComputeTask>, Without<GeneratedSurface>)>,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for (entity, plot) in query.iter().take(config.max_tasks_per_frame) {
        let function = match cache.get_or_parse(&plot.function) {
            Ok(function) => function,
            Err(err) => {
                warn!("surface plot {entity}: cannot parse `{}`: {err}", plot.function);
                commands
                    .entity(entity)
                    .insert(SurfacePlotError(err.to_string()))
                    .remove::<QueuedSurface>();
                continue;
            }
        };

        debug!(
            "surface plot {entity}: building `{}` at resolution {}",
            plot.function,
            plot.resolution.get()
        );

        // The task owns a snapshot of the inputs; the Arc'd function is a pointer bump.
        let plot = plot.clone();
        let task = task_pool.spawn(async move { plot.build_with(function.as_ref()) });

        commands.entity(entity).insert(ComputeTask(task));
    }
}

/// Polls in-flight [`ComputeTask`]s each frame and inserts [`GeneratedSurface`] on completion.
///
/// Non-blocking: tasks that haven't finished are skipped and retried next frame.
pub fn poll_surface_tasks(mut commands: Commands, mut query: Query<(Entity, &mut ComputeTask)>) {
    for (entity, mut compute_task) in query.iter_mut() {
        if let Some(generated) = block_on(future::poll_once(&mut compute_task.0)) {
            commands
                .entity(entity)
                .insert(generated)
                .remove::<ComputeTask>();
        }
    }
}

/// Uploads a [`GeneratedSurface`] into Bevy meshes, replacing any previous ones.
///
/// The surface becomes the plot entity's [`Mesh3d`]; a requested wireframe becomes a
/// child entity tagged [`WireframeOverlay`].
pub fn upload_surface(
    mut commands: Commands,
    query: Query<(Entity, &SurfacePlot, &GeneratedSurface, Option<&OverlayEntity>), With<QueuedSurface>>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (entity, plot, generated, overlay) in query.iter() {
        let surface = meshes.add(surface_mesh(&generated.mesh));

        if let Some(OverlayEntity(old)) = overlay {
            commands.entity(*old).despawn();
        }

        commands
            .entity(entity)
            .insert((Mesh3d(surface), BuiltFrom(plot.clone())))
            .remove::<(QueuedSurface, GeneratedSurface, SurfacePlotError, OverlayEntity)>();

        if let Some(lines) = &generated.wireframe {
            let overlay = commands
                .spawn((
                    Mesh3d(meshes.add(wireframe_mesh(&generated.mesh, lines.clone()))),
                    WireframeOverlay { plot: entity },
                    Transform::default(),
                    ChildOf(entity),
                ))
                .id();
            commands.entity(entity).insert(OverlayEntity(overlay));
        }

        debug!(
            "surface plot {entity}: uploaded {} vertices, {} triangles",
            generated.mesh.vertex_count(),
            generated.mesh.triangle_count()
        );
    }
}

/// Converts a [`SurfaceMesh`] into a Bevy triangle-list [`Mesh`] with positions,
/// normals, vertex colours and `u32` indices.
pub fn surface_mesh(mesh: &SurfaceMesh) -> Mesh {
    let mut bevy_mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );

    bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, mesh.vertices.clone());
    bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, mesh.normals.clone());
    bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, mesh.colors_rgba());
    bevy_mesh.insert_indices(Indices::U32(mesh.indices.clone()));

    bevy_mesh
}

/// Converts wireframe line indices into a Bevy line-list [`Mesh`] over the surface's vertices.
pub fn wireframe_mesh(mesh: &SurfaceMesh, lines: Vec<u32>) -> Mesh {
    let mut bevy_mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);

    bevy_mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, mesh.vertices.clone());
    bevy_mesh.insert_indices(Indices::U32(lines));

    bevy_mesh
}
