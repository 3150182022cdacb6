// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{convert::Infallible, error::Error, sync::Arc};

use ed25519_dalek::SigningKey;
use hyper::{Method, Response, StatusCode, service::service_fn};
use hyper_util::rt::{TokioExecutor, TokioIo};
use juniper_hyper::{graphiql, graphql, playground};
use tokio::net::TcpListener;

use champs::{
    config::Config,
    db::{self, PgStore},
    graphql::{BaseContext, Context, Schema, auth::bearer_token},
    routes,
    standings::StandingsCalculator,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let keypair_json = std::fs::read_to_string(&config.signing_key_file)?;
    let signing_key: SigningKey = serde_json::from_str(&keypair_json)?;

    let pool = db::create_pool(&config.database_url).await?;

    // The ranked entity is fixed for the lifetime of the process
    let mode = match config.user_mode {
        Some(mode) => mode,
        None => db::store::load_account_mode(&pool).await?,
    };
    tracing::info!("Ranking accounts in {mode:?} mode");

    let root_node: Arc<Schema> = Arc::new(champs::graphql::schema());

    let ctx = BaseContext {
        calculator: Arc::new(StandingsCalculator::new(PgStore::new(pool, mode))),
        verifying_key: signing_key.verifying_key(),
    };

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!("Listening on http://{}", config.listen_addr);
    loop {
        let (stream, _) = listener.accept().await?;

        let io = TokioIo::new(stream);

        let root_node = root_node.clone();
        let ctx = ctx.clone();

        tokio::spawn(async move {
            if let Err(e) = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                .serve_connection(
                    io,
                    service_fn(move |req| {
                        let root_node = root_node.clone();
                        let ctx = ctx.clone();

                        let user_details = req
                            .headers()
                            .get("authorization")
                            .and_then(|auth_header| auth_header.to_str().ok())
                            .and_then(bearer_token)
                            .and_then(|token| ctx.authenticate(token));

                        async move {
                            Ok::<_, Infallible>(match (req.method(), req.uri().path()) {
                                (&Method::GET, "/graphql") | (&Method::POST, "/graphql") => {
                                    let ctx = Context::new(ctx, user_details);
                                    graphql(root_node, Arc::new(ctx), req).await
                                }
                                (&Method::OPTIONS, "/graphql") => {
                                    let mut resp = Response::new(String::new());
                                    *resp.status_mut() = StatusCode::NO_CONTENT;
                                    resp
                                }
                                (&Method::GET, "/graphiql") => graphiql("/graphql", None).await,
                                (&Method::GET, "/playground") => playground("/graphql", None).await,
                                (&Method::GET, routes::CHAMPS_PATH) => {
                                    routes::category_champs(ctx.calculator.as_ref(), user_details.as_ref())
                                        .await
                                }
                                _ => {
                                    let mut resp = Response::new(String::new());
                                    *resp.status_mut() = StatusCode::NOT_FOUND;
                                    resp
                                }
                            })
                        }
                    }),
                )
                .await
            {
                tracing::error!("Error serving connection: {e}");
            }
        });
    }
}
