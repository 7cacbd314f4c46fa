//! Version 1 of the transform API.

use super::rejection::{ApiRejection, FieldErrors};
use super::ApiState;
use crate::core::error::AppError;
use crate::core::invoker::{build_command, build_image_command};
use crate::core::transform_graph::GraphError;
use crate::core::types::{ErrorCategory, InputCoords, Point, TransformChain};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

type Params = HashMap<String, String>;

pub fn routes() -> Router {
    Router::new()
        .route("/transform-point", get(transform_point))
        .route("/transform-points", post(transform_points))
        .route("/get-mesh-transform-command", get(mesh_transform_command))
        .route("/get-image-transform-command", get(image_transform_command))
        .route("/graph.yaml", get(graph_yaml))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransformPointResponse {
    pub target_point: Point,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformPointsRequest {
    pub source_space: String,
    pub target_space: String,
    pub source_points: Vec<Point>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransformPointsResponse {
    pub target_points: Vec<Point>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransformCommandResponse {
    pub transform_command: Vec<String>,
}

async fn transform_point(
    Extension(state): Extension<Arc<ApiState>>,
    query: Result<Query<Params>, QueryRejection>,
) -> Result<Json<TransformPointResponse>, ApiRejection> {
    let Query(params) = query.map_err(query_rejection)?;
    let mut errors = FieldErrors::default();
    let source_space = required(&params, "source_space", &mut errors);
    let target_space = required(&params, "target_space", &mut errors);
    let x = required_float(&params, "x", &mut errors);
    let y = required_float(&params, "y", &mut errors);
    let z = required_float(&params, "z", &mut errors);
    let (Some(source_space), Some(target_space), Some(x), Some(y), Some(z)) =
        (source_space, target_space, x, y, z)
    else {
        return Err(ApiRejection::unprocessable(errors));
    };

    let chain = resolve_chain(&state, source_space, target_space)?;
    let target_point = state
        .transformer
        .transform_point([x, y, z], &chain, &state.instance_path)
        .await?;
    Ok(Json(TransformPointResponse { target_point }))
}

async fn transform_points(
    Extension(state): Extension<Arc<ApiState>>,
    payload: Result<Json<TransformPointsRequest>, JsonRejection>,
) -> Result<Json<TransformPointsResponse>, ApiRejection> {
    let Json(request) = payload.map_err(|rejection| {
        ApiRejection::new(rejection.status(), "SB-VALIDATION", rejection.body_text())
    })?;
    let chain = resolve_chain(&state, &request.source_space, &request.target_space)?;
    if request.source_points.is_empty() {
        return Ok(Json(TransformPointsResponse {
            target_points: Vec::new(),
        }));
    }
    let target_points = state
        .transformer
        .transform_points(&request.source_points, &chain, &state.instance_path)
        .await?;
    Ok(Json(TransformPointsResponse { target_points }))
}

async fn mesh_transform_command(
    Extension(state): Extension<Arc<ApiState>>,
    query: Result<Query<Params>, QueryRejection>,
) -> Result<Json<TransformCommandResponse>, ApiRejection> {
    let Query(params) = query.map_err(query_rejection)?;
    let (source_space, target_space, input_coords) = command_params(&params)?;

    let direct_chain = state
        .graph
        .get_transform_chain(source_space, target_space)
        .map_err(unknown_space)?;
    let inverse_chain = state
        .graph
        .get_transform_chain(target_space, source_space)
        .map_err(unknown_space)?;
    if direct_chain.is_none() && inverse_chain.is_none() {
        return Err(not_reachable(source_space, target_space));
    }

    let transform_command = build_command(
        input_coords,
        direct_chain.as_deref(),
        inverse_chain.as_deref(),
        None,
    );
    Ok(Json(TransformCommandResponse { transform_command }))
}

async fn image_transform_command(
    Extension(state): Extension<Arc<ApiState>>,
    query: Result<Query<Params>, QueryRejection>,
) -> Result<Json<TransformCommandResponse>, ApiRejection> {
    let Query(params) = query.map_err(query_rejection)?;
    let (source_space, target_space, input_coords) = command_params(&params)?;

    // Images are resampled by pulling target voxels back into the source space.
    let inverse_chain = resolve_chain(&state, target_space, source_space)?;
    let transform_command = build_image_command(input_coords, &inverse_chain)?;
    Ok(Json(TransformCommandResponse { transform_command }))
}

async fn graph_yaml(Extension(state): Extension<Arc<ApiState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/yaml")],
        Bytes::clone(&state.graph_yaml),
    )
}

fn command_params(params: &Params) -> Result<(&str, &str, Option<InputCoords>), ApiRejection> {
    let mut errors = FieldErrors::default();
    let source_space = required(params, "source_space", &mut errors);
    let target_space = required(params, "target_space", &mut errors);
    let input_coords = match params.get("input_coords") {
        Some(raw) => match raw.parse::<InputCoords>() {
            Ok(coords) => Some(coords),
            Err(message) => {
                errors.push("input_coords", message);
                None
            }
        },
        None => None,
    };
    errors.into_result()?;
    match (source_space, target_space) {
        (Some(source_space), Some(target_space)) => Ok((source_space, target_space, input_coords)),
        _ => Err(ApiRejection::unprocessable(FieldErrors::default())),
    }
}

fn required<'a>(params: &'a Params, field: &str, errors: &mut FieldErrors) -> Option<&'a str> {
    match params.get(field).map(String::as_str) {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            errors.push(field, "Missing data for required field.");
            None
        }
    }
}

fn required_float(params: &Params, field: &str, errors: &mut FieldErrors) -> Option<f64> {
    let raw = required(params, field, errors)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.push(field, "Not a valid number.");
            None
        }
    }
}

fn resolve_chain(state: &ApiState, from: &str, to: &str) -> Result<TransformChain, ApiRejection> {
    state
        .graph
        .get_transform_chain(from, to)
        .map_err(unknown_space)?
        .ok_or_else(|| not_reachable(from, to))
}

fn unknown_space(err: GraphError) -> ApiRejection {
    AppError::from(err).into()
}

fn not_reachable(from: &str, to: &str) -> ApiRejection {
    AppError::new(
        ErrorCategory::NotReachable,
        format!("no transform chain from {:?} to {:?}", from, to),
    )
    .into()
}

fn query_rejection(rejection: QueryRejection) -> ApiRejection {
    ApiRejection::bad_request("SB-VALIDATION", rejection.body_text())
}
