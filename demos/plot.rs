use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGridBundle, InfiniteGridPlugin, InfiniteGridSettings};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};
use bevy_surface_plot::{
    SurfacePlot, SurfacePlotPlugin,
    color::ColorMap,
    plot::SurfacePresentation,
    plugin::{SurfacePlotError, WireframeOverlay},
    props::SurfacePlotProps,
};

const PROPS: &str = r#"{
    "function": "sin(x) * cos(y)",
    "domain": { "x": [-3.14, 3.14], "y": [-3.14, 3.14] },
    "resolution": 80,
    "colorScheme": "viridis",
    "cameraPosition": [6, 5, 6],
    "enableControls": true,
    "wireframe": false
}"#;

const FUNCTIONS: [&str; 5] = [
    "sin(x) * cos(y)",
    "x^2 - y^2",
    "exp(-(x^2 + y^2) / 2) * 2",
    "sin(sqrt(x^2 + y^2) * 2) / 2",
    "1 / (x * y)",
];

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            SurfacePlotPlugin::default(),
            PanOrbitCameraPlugin,
            InfiniteGridPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(Update, (cycle_plot, style_overlays, report_errors))
        .run();
}

fn setup(mut commands: Commands, mut materials: ResMut<Assets<StandardMaterial>>) {
    let props: SurfacePlotProps = match serde_json::from_str(PROPS) {
        Ok(props) => props,
        Err(err) => {
            error!("invalid plot props: {err}");
            return;
        }
    };
    let (plot, presentation) = match props.into_components() {
        Ok(components) => components,
        Err(err) => {
            error!("invalid plot props: {err}");
            return;
        }
    };

    commands.spawn(InfiniteGridBundle {
        settings: InfiniteGridSettings {
            fadeout_distance: 100.0,
            ..Default::default()
        },
        ..Default::default()
    });

    let mut camera = commands.spawn((
        Camera3d::default(),
        Transform::from_translation(presentation.camera_position).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    if presentation.enable_controls {
        camera.insert(PanOrbitCamera::default());
    }

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            ..Default::default()
        },
        Transform::default().with_rotation(Quat::from_rotation_x(-45.0_f32.to_radians())),
    ));

    // Surfaces are z-up; Bevy is y-up.
    commands.spawn((
        plot,
        presentation,
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            double_sided: true,
            cull_mode: None,
            ..Default::default()
        })),
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
    ));

    info!("Space: next function, C: next colour scheme, W: toggle wireframe");
}

fn cycle_plot(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut plots: Query<&mut SurfacePlot, With<SurfacePresentation>>,
    mut index: Local<usize>,
) {
    for mut plot in plots.iter_mut() {
        if keyboard.just_pressed(KeyCode::Space) {
            *index = (*index + 1) % FUNCTIONS.len();
            plot.function = FUNCTIONS[*index].to_owned();
        }
        if keyboard.just_pressed(KeyCode::KeyC) {
            let next = ColorMap::ALL
                .iter()
                .position(|&m| m == plot.color_map)
                .map_or(0, |k| (k + 1) % ColorMap::ALL.len());
            plot.color_map = ColorMap::ALL[next];
        }
        if keyboard.just_pressed(KeyCode::KeyW) {
            plot.wireframe = !plot.wireframe;
        }
    }
}

fn style_overlays(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    overlays: Query<Entity, Added<WireframeOverlay>>,
) {
    for entity in overlays.iter() {
        commands.entity(entity).insert(MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::BLACK,
            unlit: true,
            ..Default::default()
        })));
    }
}

fn report_errors(errors: Query<&SurfacePlotError, Added<SurfacePlotError>>) {
    for SurfacePlotError(message) in errors.iter() {
        warn!("{message}");
    }
}
