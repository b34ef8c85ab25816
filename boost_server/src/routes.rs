//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: they unpack the request, call one of the engine APIs,
//! and serialize the result. Business rules live in `boost_engine`.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database call is therefore awaited, never blocked on.
//!
//! Routes marked `requires [..]` are wrapped in the [`AclMiddlewareFactory`](crate::middleware::AclMiddlewareFactory),
//! which rejects callers without the listed roles. Routes that take [`JwtClaims`] need a valid access token, but no
//! particular role. Everything else is public.
use actix_web::{get, web, HttpResponse, Responder};
use boost_engine::{
    db_types::{BoosterUpdate, NewBoosterProfile, NewOrder, NewReview, Role, UpdateUserProfile, UserId},
    market_api::{
        booster_objects::{AvailabilityUpdate, BoosterQueryFilter},
        catalog_objects::GameQueryFilter,
        order_objects::{CancelRequest, OrderQueryFilter, StatusUpdate},
        pagination::Pagination,
    },
    traits::{AccountManagement, BoosterManagement, CatalogManagement, MarketplaceDatabase},
    AccountApi,
    BoosterApi,
    CatalogApi,
    OrderFlowApi,
};
use log::*;

use crate::{
    auth::JwtClaims,
    data_objects::{
        BoosterSearchParams,
        JsonResponse,
        LimitParams,
        QuoteParams,
        RankDifferenceParams,
        SearchParams,
        VerifyRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> B>)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

fn not_found<S: Into<String>>(what: S) -> ServerError {
    ServerError::NoRecordFound(what.into())
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(games => Get "/games" impl CatalogManagement);
/// Active games, optionally narrowed by `?platforms=PC,PS5` and a `search` term.
pub async fn games<B: CatalogManagement>(
    query: web::Query<GameQueryFilter>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner();
    trace!("💻️ GET games ({filter:?})");
    let games = api.games(&filter).await?;
    Ok(HttpResponse::Ok().json(games))
}

route!(games_page => Get "/games/page" impl CatalogManagement);
pub async fn games_page<B: CatalogManagement>(
    query: web::Query<GameQueryFilter>,
    pagination: web::Query<Pagination>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let page = api.games_page(&query, pagination.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

route!(popular_games => Get "/games/popular" impl CatalogManagement);
pub async fn popular_games<B: CatalogManagement>(
    query: web::Query<LimitParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let games = api.popular_games(query.limit).await?;
    Ok(HttpResponse::Ok().json(games))
}

route!(search_games => Get "/games/search" impl CatalogManagement);
pub async fn search_games<B: CatalogManagement>(
    query: web::Query<SearchParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET search games for '{}'", query.q);
    let games = api.search_games(&query.q, query.limit).await?;
    Ok(HttpResponse::Ok().json(games))
}

route!(platforms => Get "/games/platforms" impl CatalogManagement);
pub async fn platforms<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    let platforms = api.available_platforms().await?;
    Ok(HttpResponse::Ok().json(platforms))
}

route!(games_by_platform => Get "/games/platform/{platform}" impl CatalogManagement);
pub async fn games_by_platform<B: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let games = api.games_by_platform(&path).await?;
    Ok(HttpResponse::Ok().json(games))
}

route!(game_by_id => Get "/games/id/{id}" impl CatalogManagement);
pub async fn game_by_id<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let game = api.game_by_id(id).await?.ok_or_else(|| not_found(format!("Game {id}")))?;
    Ok(HttpResponse::Ok().json(game))
}

route!(game_by_slug => Get "/games/slug/{slug}" impl CatalogManagement);
pub async fn game_by_slug<B: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let slug = path.into_inner();
    let game = api.game_by_slug(&slug).await?.ok_or_else(|| not_found(format!("Game '{slug}'")))?;
    Ok(HttpResponse::Ok().json(game))
}

route!(game_with_ranks => Get "/games/slug/{slug}/ranks" impl CatalogManagement);
/// The game together with its rank ladder, lowest rank first.
pub async fn game_with_ranks<B: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let slug = path.into_inner();
    let game = api.game_with_ranks(&slug).await?.ok_or_else(|| not_found(format!("Game '{slug}'")))?;
    Ok(HttpResponse::Ok().json(game))
}

route!(rank_hierarchy => Get "/games/id/{id}/ranks" impl CatalogManagement);
pub async fn rank_hierarchy<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let ranks = api.rank_hierarchy(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ranks))
}

route!(rank_difference => Get "/games/id/{id}/rank_difference" impl CatalogManagement);
/// `?from={rank_id}&to={rank_id}`
pub async fn rank_difference<B: CatalogManagement>(
    path: web::Path<i64>,
    query: web::Query<RankDifferenceParams>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let difference = api.rank_difference(path.into_inner(), query.from, query.to).await?;
    Ok(HttpResponse::Ok().json(difference))
}

route!(rank_by_id => Get "/ranks/{id}" impl CatalogManagement);
pub async fn rank_by_id<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let rank = api.rank_by_id(id).await?.ok_or_else(|| not_found(format!("Rank {id}")))?;
    Ok(HttpResponse::Ok().json(rank))
}

route!(service_types => Get "/service_types" impl CatalogManagement);
pub async fn service_types<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    let services = api.service_types().await?;
    Ok(HttpResponse::Ok().json(services))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(quote => Post "/orders/quote" impl MarketplaceDatabase);
/// Prices an order without placing it. No authentication is needed.
pub async fn quote<B: MarketplaceDatabase>(
    body: web::Json<QuoteParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let price = api.quote(body.into_inner().into());
    Ok(HttpResponse::Ok().json(price))
}

route!(create_order => Post "/orders" impl MarketplaceDatabase);
/// Places an order for the caller. The order is priced server-side, so request bodies carrying prices are rejected.
pub async fn create_order<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new order for {}", claims.sub);
    let order = api.create_order(&claims.user_id(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl MarketplaceDatabase);
/// The orders the caller has placed, newest first. Accepts the same filters as `/orders/all`.
pub async fn my_orders<B: MarketplaceDatabase>(
    claims: JwtClaims,
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {} ({})", claims.sub, *query);
    let orders = api.my_orders(&claims.user_id(), &query).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(booster_orders => Get "/orders/booster" impl MarketplaceDatabase);
/// The orders assigned to any of the caller's booster profiles.
pub async fn booster_orders<B: MarketplaceDatabase>(
    claims: JwtClaims,
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET booster_orders for {} ({})", claims.sub, *query);
    let orders = api.booster_orders(&claims.user_id(), &query).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(all_orders => Get "/orders/all" impl MarketplaceDatabase where requires [Role::Admin]);
/// Every order in the marketplace, one page at a time.
///
/// Filters: `status` and `priority` (comma separated lists), `game_id`, `date_from` and `date_to` (RFC 3339).
/// Paging: `page` (from 1) and `limit` (1 to 100).
pub async fn all_orders<B: MarketplaceDatabase>(
    query: web::Query<OrderQueryFilter>,
    pagination: web::Query<Pagination>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all orders ({})", *query);
    let page = api.orders_page(&query, pagination.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

route!(order_stats => Get "/orders/stats" impl MarketplaceDatabase where requires [Role::Admin]);
pub async fn order_stats<B: MarketplaceDatabase>(api: web::Data<OrderFlowApi<B>>) -> Result<HttpResponse, ServerError> {
    let stats = api.order_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

route!(order_by_id => Get "/orders/id/{id}" impl MarketplaceDatabase);
/// The order with its progress timeline, payments and reviews. Only the requester, the assigned booster and
/// administrators may see it.
pub async fn order_by_id<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let details = api.order_details(&claims.actor(), id).await?.ok_or_else(|| not_found(format!("Order {id}")))?;
    Ok(HttpResponse::Ok().json(details))
}

route!(accept_order => Post "/orders/id/{id}/accept" impl MarketplaceDatabase);
pub async fn accept_order<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ POST accept order #{id} by {}", claims.sub);
    let order = api.accept_order(&claims.user_id(), id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Post "/orders/id/{id}/status" impl MarketplaceDatabase);
/// Moves the order along its lifecycle, optionally with a progress message, percentage and screenshot.
pub async fn update_order_status<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<StatusUpdate>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let update = body.into_inner();
    debug!("💻️ POST status {} for order #{id} by {}", update.status, claims.sub);
    let order = api.update_status(&claims.actor(), id, update).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Post "/orders/id/{id}/cancel" impl MarketplaceDatabase);
/// Cancels one of the caller's own orders. The body, `{"reason": "..."}`, is optional.
pub async fn cancel_order<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: Option<web::Json<CancelRequest>>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let reason = body.and_then(|b| b.into_inner().reason);
    debug!("💻️ POST cancel order #{id} by {}", claims.sub);
    let order = api.cancel_order(&claims.user_id(), id, reason).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(review_order => Post "/orders/id/{id}/review" impl MarketplaceDatabase);
pub async fn review_order<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<NewReview>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let review = api.review_order(&claims.user_id(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(review))
}

//----------------------------------------------   Boosters  ----------------------------------------------------
route!(create_booster_profile => Post "/boosters" impl BoosterManagement, CatalogManagement);
pub async fn create_booster_profile<B: BoosterManagement + CatalogManagement>(
    claims: JwtClaims,
    body: web::Json<NewBoosterProfile>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST booster profile for {}", claims.sub);
    let booster = api.create_profile(&claims.user_id(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(booster))
}

route!(my_booster_profiles => Get "/boosters/mine" impl BoosterManagement, CatalogManagement);
pub async fn my_booster_profiles<B: BoosterManagement + CatalogManagement>(
    claims: JwtClaims,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let boosters = api.my_profiles(&claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(boosters))
}

route!(booster_dashboard => Get "/boosters/dashboard" impl BoosterManagement, CatalogManagement);
pub async fn booster_dashboard<B: BoosterManagement + CatalogManagement>(
    claims: JwtClaims,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let stats = api.dashboard(&claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

route!(available_boosters => Get "/boosters/available" impl BoosterManagement, CatalogManagement);
/// Verified boosters who are taking orders. Filters: `game_id`, `server_regions` and `languages` (comma separated),
/// `min_rating`.
pub async fn available_boosters<B: BoosterManagement + CatalogManagement>(
    query: web::Query<BoosterQueryFilter>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let boosters = api.available_boosters(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(boosters))
}

route!(boosters_page => Get "/boosters/page" impl BoosterManagement, CatalogManagement);
pub async fn boosters_page<B: BoosterManagement + CatalogManagement>(
    query: web::Query<BoosterQueryFilter>,
    pagination: web::Query<Pagination>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let page = api.boosters_page(query.into_inner(), pagination.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

route!(top_boosters => Get "/boosters/top/{game_id}" impl BoosterManagement, CatalogManagement);
pub async fn top_boosters<B: BoosterManagement + CatalogManagement>(
    path: web::Path<i64>,
    query: web::Query<LimitParams>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let boosters = api.top_boosters(path.into_inner(), query.limit).await?;
    Ok(HttpResponse::Ok().json(boosters))
}

route!(search_boosters => Get "/boosters/search" impl BoosterManagement, CatalogManagement);
pub async fn search_boosters<B: BoosterManagement + CatalogManagement>(
    query: web::Query<BoosterSearchParams>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let BoosterSearchParams { q, game_id, limit } = query.into_inner();
    let boosters = api.search_boosters(&q, game_id, limit).await?;
    Ok(HttpResponse::Ok().json(boosters))
}

route!(booster_by_id => Get "/boosters/id/{id}" impl BoosterManagement, CatalogManagement);
pub async fn booster_by_id<B: BoosterManagement + CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let booster = api.booster_by_id(id).await?.ok_or_else(|| not_found(format!("Booster {id}")))?;
    Ok(HttpResponse::Ok().json(booster))
}

route!(booster_profile => Get "/boosters/profile/{user}/{game_id}" impl BoosterManagement, CatalogManagement);
/// A user's booster profile for one game.
pub async fn booster_profile<B: BoosterManagement + CatalogManagement>(
    path: web::Path<(String, i64)>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (user, game_id) = path.into_inner();
    let user_id = UserId::from(user);
    let booster = api
        .profile(&user_id, game_id)
        .await?
        .ok_or_else(|| not_found(format!("{user_id} has no booster profile for game {game_id}")))?;
    Ok(HttpResponse::Ok().json(booster))
}

route!(update_booster_profile => Patch "/boosters/id/{id}" impl BoosterManagement, CatalogManagement);
pub async fn update_booster_profile<B: BoosterManagement + CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<BoosterUpdate>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let booster = api.update_profile(&claims.actor(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(booster))
}

route!(update_booster_availability => Post "/boosters/id/{id}/availability" impl BoosterManagement, CatalogManagement);
pub async fn update_booster_availability<B: BoosterManagement + CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<AvailabilityUpdate>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let booster = api.update_availability(&claims.actor(), path.into_inner(), body.is_available).await?;
    Ok(HttpResponse::Ok().json(booster))
}

route!(delete_booster_profile => Delete "/boosters/id/{id}" impl BoosterManagement, CatalogManagement);
pub async fn delete_booster_profile<B: BoosterManagement + CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    api.delete_profile(&claims.actor(), id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Booster profile {id} deleted"))))
}

route!(verify_booster => Post "/boosters/id/{id}/verify" impl BoosterManagement, CatalogManagement where requires [Role::Admin]);
pub async fn verify_booster<B: BoosterManagement + CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<VerifyRequest>,
    api: web::Data<BoosterApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let booster = api.verify_booster(&claims.actor(), path.into_inner(), body.verified).await?;
    Ok(HttpResponse::Ok().json(booster))
}

//----------------------------------------------   Account  ----------------------------------------------------
route!(my_profile => Get "/profile" impl AccountManagement);
pub async fn my_profile<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let profile = api.my_profile(&claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

route!(update_my_profile => Put "/profile" impl AccountManagement);
pub async fn update_my_profile<B: AccountManagement>(
    claims: JwtClaims,
    body: web::Json<UpdateUserProfile>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let profile = api.update_profile(&claims.user_id(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

route!(my_dashboard => Get "/dashboard" impl AccountManagement);
pub async fn my_dashboard<B: AccountManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let stats = api.dashboard(&claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(stats))
}
