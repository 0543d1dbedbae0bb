use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use salt_plugins::dispatch::{handle_request, PluginContext};
use salt_plugins::handlers::{Grains, Highstate, StateList};
use salt_plugins::ports::master::{MasterApi, MasterError, MasterResponse, MasterRoute};
use salt_plugins::runner::JobRunner;
use salt_plugins::schema::{Envelope, JobDescriptor};
use salt_plugins::PluginError;

struct FixedRunner;

#[async_trait::async_trait]
impl JobRunner for FixedRunner {
    async fn submit(&self, _request: &Envelope, _job: &JobDescriptor) -> Result<i64, PluginError> {
        Ok(1)
    }
}

struct FixedMaster;

#[async_trait::async_trait]
impl MasterApi for FixedMaster {
    async fn get(&self, _route: &MasterRoute) -> Result<MasterResponse, MasterError> {
        Ok(MasterResponse::ok(r#"[{"Id":7,"SysName":"prod"}]"#))
    }

    async fn post(
        &self,
        _route: &MasterRoute,
        _body: Vec<u8>,
    ) -> Result<MasterResponse, MasterError> {
        Ok(MasterResponse::ok(r#"{"JobId":1}"#))
    }
}

fn ctx() -> PluginContext {
    PluginContext {
        master: Arc::new(FixedMaster),
        runner: Arc::new(FixedRunner),
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().build().unwrap()
}

fn bench_grain_get(c: &mut Criterion) {
    let rt = runtime();
    let ctx = ctx();
    let req = Envelope::new("GET").with_query("salt_id", "web01");

    c.bench_function("grain_get", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(handle_request(&Grains, &ctx, &req).await) });
    });
}

fn bench_highstate_post(c: &mut Criterion) {
    let rt = runtime();
    let ctx = ctx();
    let ids: Vec<String> = (0..50).map(|i| format!("minion-{i:03}")).collect();
    let req = Envelope::new("POST")
        .with_query("env_id", "7")
        .with_body(serde_json::to_vec(&ids).unwrap());

    c.bench_function("highstate_post_50_ids", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(handle_request(&Highstate, &ctx, &req).await) });
    });
}

fn bench_state_list_with_lookup(c: &mut Criterion) {
    let rt = runtime();
    let ctx = ctx();
    let req = Envelope::new("GET")
        .with_query("env_id", "7")
        .with_query("version", "3")
        .with_path_param("login", "admin")
        .with_path_param("GUID", "5e1f");

    c.bench_function("state_list_with_lookup", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(handle_request(&StateList, &ctx, &req).await) });
    });
}

criterion_group!(
    benches,
    bench_grain_get,
    bench_highstate_post,
    bench_state_list_with_lookup
);
criterion_main!(benches);
