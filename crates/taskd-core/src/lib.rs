//! taskd-core
//!
//! Core building blocks for the taskd service.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, state, caller, page, errors）
//! - **ports**: 抽象化レイヤー（TaskStore, Clock, IdGenerator）
//! - **impls**: 実装（InMemoryTaskStore）
//! - **queue**: スキャナとワーカーの間の有界キュー
//! - **app**: アプリケーションロジック（builder, task_service, scanner, worker_loop, auto_complete）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;
