use approx::assert_abs_diff_eq;
use bevy_surface_plot::{
    SurfaceMeshGenerator, SurfacePlot, parse,
    color::{ColorMap, BLACK, create_gradient, get_color},
    error::ParseError,
    normals::compute_normals,
    props::SurfacePlotProps,
    types::{Domain, Interval, Resolution, ZRange},
    wireframe::generate_wireframe_indices,
};

fn unit_domain() -> Domain {
    Domain::new(Interval::new(-1.0, 1.0), Interval::new(-1.0, 1.0)).unwrap()
}

#[test]
fn parse_failures() {
    assert_eq!(parse(""), Err(ParseError::EmptyExpression));
    assert!(matches!(parse("x +"), Err(ParseError::SyntaxError(_))));
}

#[test]
fn evaluates_linear_expression() {
    assert_eq!(parse("2*x+3*y").unwrap().evaluate(1.0, 1.0), 5.0);
}

#[test]
fn bowl_mesh_counts() {
    let bowl = parse("x^2 + y^2").unwrap();
    let mesh = SurfaceMeshGenerator::default().generate(&bowl, &unit_domain(), Resolution::new(2).unwrap(), None);

    assert_eq!(mesh.vertex_count(), 9);
    assert_eq!(mesh.indices.len(), 24);
    assert_eq!(mesh.normals_flat().len(), mesh.vertices_flat().len());
    assert_eq!(mesh.colors_flat().len(), mesh.vertices_flat().len());
}

#[test]
fn color_endpoints_and_nan() {
    for map in ColorMap::ALL {
        let stops = map.stops();
        assert_eq!(get_color(0.0, map), stops[0]);
        assert_eq!(get_color(1.0, map), *stops.last().unwrap());
        assert_eq!(get_color(f32::NAN, map), [0.0, 0.0, 0.0]);
    }
}

#[test]
fn gradient_length_matches_input() {
    let inputs: [&[f32]; 4] = [
        &[],
        &[1.0],
        &[0.0, 2.5, -1.0, f32::NAN],
        &[f32::NAN, f32::INFINITY],
    ];
    for values in inputs {
        let colors = create_gradient(values, ColorMap::Viridis, None, None);
        assert_eq!(colors.as_flattened().len(), 3 * values.len());
    }
    let all_bad = create_gradient(&[f32::NAN, f32::NEG_INFINITY], ColorMap::Ocean, None, None);
    assert!(all_bad.iter().all(|&c| c == BLACK));
}

#[test]
fn normals_unit_or_zero() {
    // Holes from sqrt's domain leave some vertices without triangles.
    let f = parse("sqrt(x) + sin(3 * y)").unwrap();
    let mesh = SurfaceMeshGenerator::default().generate(
        &|x: f64, y: f64| if x < -0.5 { f64::NAN } else { f.evaluate(x, y) },
        &unit_domain(),
        Resolution::new(8).unwrap(),
        None,
    );

    let mut touched = vec![false; mesh.vertex_count()];
    for k in &mesh.indices {
        touched[*k as usize] = true;
    }
    assert!(touched.iter().any(|t| !t));

    for (n, touched) in mesh.normals.iter().zip(&touched) {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if *touched {
            assert_abs_diff_eq!(len, 1.0, epsilon = 1e-4);
        } else {
            assert_eq!(*n, [0.0; 3]);
        }
    }
}

#[test]
fn normals_ignore_triangle_order() {
    let f = parse("sin(x) * cos(y)").unwrap();
    let mesh = SurfaceMeshGenerator::default().generate(&f, &unit_domain(), Resolution::new(5).unwrap(), None);

    let mut reversed: Vec<u32> = Vec::with_capacity(mesh.indices.len());
    for tri in mesh.indices.chunks_exact(3).rev() {
        reversed.extend_from_slice(tri);
    }
    assert_eq!(compute_normals(&mesh.vertices, &reversed), mesh.normals);
}

#[test]
fn bowl_winding_faces_up() {
    let bowl = parse("x^2 + y^2").unwrap();
    let near_origin = Domain::new(Interval::new(-0.2, 0.2), Interval::new(-0.2, 0.2)).unwrap();
    let mesh = SurfaceMeshGenerator::default().generate(&bowl, &near_origin, Resolution::new(4).unwrap(), None);

    let [a, b, c] = mesh.triangle(0);
    for k in [a, b, c] {
        assert!(mesh.normals[k as usize][2] > 0.0);
    }
}

#[test]
fn z_range_clamps_vertices_but_not_actual_bounds() {
    let f = parse("3 * x * y").unwrap();
    let mesh = SurfaceMeshGenerator::default().generate(
        &f,
        &unit_domain(),
        Resolution::new(10).unwrap(),
        Some(ZRange::new(-1.0, 1.0).unwrap()),
    );

    assert!(mesh.vertices.iter().all(|v| (-1.0..=1.0).contains(&v[2])));
    assert_abs_diff_eq!(mesh.actual_bounds.min[2], -3.0, epsilon = 1e-6);
    assert_abs_diff_eq!(mesh.actual_bounds.max[2], 3.0, epsilon = 1e-6);
    assert_eq!(mesh.clamped_bounds.min[2], -1.0);
    assert_eq!(mesh.clamped_bounds.max[2], 1.0);
}

#[test]
fn wireframe_edge_count() {
    for r in [1_u32, 2, 4, 9] {
        let indices = generate_wireframe_indices(Resolution::new(r).unwrap());
        assert_eq!(indices.len() / 2, (2 * r * (r + 1)) as usize);
    }
    assert_eq!(generate_wireframe_indices(Resolution::new(4).unwrap()).len() / 2, 40);
}

#[test]
fn props_to_mesh() {
    let props: SurfacePlotProps = serde_json::from_str(
        r#"{
            "function": "x * y",
            "domain": { "x": [-2, 2], "y": [-1, 1] },
            "resolution": 6,
            "colorScheme": "coolwarm",
            "zRange": [-1, 1],
            "wireframe": true
        }"#,
    )
    .unwrap();
    let (plot, _presentation): (SurfacePlot, _) = props.into_components().unwrap();

    let generated = plot.build().unwrap();
    assert_eq!(generated.mesh.vertex_count(), 49);
    assert_eq!(generated.wireframe.as_ref().map(Vec::len), Some(4 * 6 * 7));
    assert!(generated.mesh.colors.iter().flatten().all(|c| (0.0..=1.0).contains(c)));
    assert_eq!(generated.mesh.actual_bounds.max[2], 2.0);
}
