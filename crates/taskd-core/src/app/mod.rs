//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **TaskService**: 認可つきのタスク操作（作成・取得・一覧・更新・削除）
//! - **UserService**: アカウント登録とログイン
//! - **Scanner**: 自動完了候補の発見とキュー投入
//! - **WorkerGroup**: 候補の再検証と完了（並行ワーカー群）
//! - **AutoCompleter**: スキャナとワーカー群の起動・停止

pub mod auto_complete;
pub mod builder;
pub mod scanner;
pub mod status;
pub mod task_service;
pub mod user_service;
pub mod worker_loop;

// 主要な型を再エクスポート
pub use self::auto_complete::{AutoCompleteConfig, AutoCompleter, AutoCompleterHandle};
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::scanner::Scanner;
pub use self::status::{AutoCompleteOutcome, ScanReport};
pub use self::task_service::TaskService;
pub use self::user_service::UserService;
pub use self::worker_loop::{AutoCompleteWorker, WorkerGroup};
