use crate::{AppState, error::AppError};
use analytics::DatasetReport;
use axum::{
    Json,
    extract::{Query, State},
};
use core_types::Measure;
use serde::Deserialize;
use std::sync::Arc;
use views::{
    BrandFilter, BrandShareView, FeatureView, MarketOverview, PriceTierView, ViewResult, ViewSpec,
};

/// `?brands=Ohuhu,Arteza`; absent or empty selects every brand.
#[derive(Debug, Default, Deserialize)]
pub struct BrandQuery {
    pub brands: Option<String>,
}

impl BrandQuery {
    fn filter(&self) -> BrandFilter {
        BrandFilter::from_list(self.brands.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    pub brands: Option<String>,
    /// `price` (default), `rate` or `sales`.
    pub metric: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    /// Comma-separated dimension names; empty for a grand total.
    pub dims: Option<String>,
    pub measure: Option<String>,
    pub agg: Option<String>,
    pub brands: Option<String>,
}

/// # GET /api/summary
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Result<Json<DatasetReport>, AppError> {
    let dataset = state.dataset().await?;
    Ok(Json(dataset.report()))
}

/// # GET /api/brands
pub async fn get_brands(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, AppError> {
    let dataset = state.dataset().await?;
    Ok(Json(dataset.brands().to_vec()))
}

/// # GET /api/views/overview
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<MarketOverview>, AppError> {
    let metric = match query.metric.as_deref() {
        Some(m) if !m.trim().is_empty() => m.parse::<Measure>()?,
        _ => Measure::Price,
    };
    let dataset = state.dataset().await?;
    let filter = BrandFilter::from_list(query.brands.as_deref());
    Ok(Json(views::market_overview(&dataset, &filter, metric)?))
}

/// # GET /api/views/brand-share
pub async fn get_brand_share(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<BrandShareView>, AppError> {
    let dataset = state.dataset().await?;
    Ok(Json(views::brand_share(&dataset, &query.filter(), &state.options)?))
}

/// # GET /api/views/price-tiers
/// Market-wide; takes no brand selection.
pub async fn get_price_tiers(State(state): State<Arc<AppState>>) -> Result<Json<PriceTierView>, AppError> {
    let dataset = state.dataset().await?;
    Ok(Json(views::price_tiers(&dataset)))
}

/// # GET /api/views/features
pub async fn get_features(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<FeatureView>, AppError> {
    let dataset = state.dataset().await?;
    Ok(Json(views::features(&dataset, &query.filter())))
}

/// # GET /api/query
/// The generic slice: `?dims=month,brand&measure=amount&agg=sum&brands=Ohuhu`.
pub async fn get_query(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ViewResult>, AppError> {
    let spec = ViewSpec::parse(
        query.dims.as_deref().unwrap_or(""),
        query.measure.as_deref().unwrap_or("amount"),
        query.agg.as_deref().unwrap_or("sum"),
    )?;
    let dataset = state.dataset().await?;
    let filter = BrandFilter::from_list(query.brands.as_deref());
    Ok(Json(views::assemble(&dataset, &filter, &spec)))
}

/// # POST /api/cache/refresh
/// Reloads the dataset from disk and returns the new summary.
pub async fn refresh_cache(State(state): State<Arc<AppState>>) -> Result<Json<DatasetReport>, AppError> {
    let dataset = state.refresh().await?;
    Ok(Json(dataset.report()))
}
