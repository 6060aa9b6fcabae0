//! Testing utilities for the scaffold workspace
//!
//! Shared fixtures (the two-table blog project), canned stage responses and
//! a scripted model client that records every request it receives.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use scaffold_core::{
    Endpoint, EndpointGroup, Field, FieldType, ModelClient, ModelError, ModelRequest, ProjectSpec,
    StageId, StorageEngine, Table,
};
use serde_json::json;
use std::collections::HashMap;

/// Naming plan a well-behaved planner returns for [`blog_spec`]
pub const BLOG_PLAN: &str = r#"{
  "project_slug": "blog-api",
  "base_dir": "src",
  "entry_point": "src/app.js",
  "database_file": "src/config/database.js",
  "database_export": "sequelize",
  "conventions": {
    "model_name": "PascalCase",
    "table_name": "snake_case",
    "file_name": "camelCase",
    "service_suffix": "Service"
  },
  "file_structure": {
    "models": ["src/models/user.js", "src/models/post.js"],
    "services": ["src/services/userService.js", "src/services/postService.js"],
    "routes": ["src/routes/posts.js"],
    "config": ["src/config/database.js", "src/app.js"],
    "middleware": ["src/middleware/errorHandler.js"]
  },
  "imports": {
    "database": "const sequelize = require('../config/database');",
    "model": "const {name} = require('../models/{module}');",
    "service": "const {name} = require('../services/{module}');"
  }
}"#;

pub const DATABASE_IMPORT: &str = "const sequelize = require('../config/database');";

/// Not JSON at all, even after recovery
pub const UNPARSABLE: &str = "I'm sorry, I can't produce the model files right now.";

/// Two tables, one endpoint group, PostgreSQL
pub fn blog_spec() -> ProjectSpec {
    ProjectSpec {
        name: "Blog API".to_string(),
        description: "Users write posts".to_string(),
        tables: vec![
            Table {
                name: "users".to_string(),
                fields: vec![
                    Field::new("id", FieldType::Integer).primary(),
                    Field::new("email", FieldType::String),
                ],
            },
            Table {
                name: "posts".to_string(),
                fields: vec![
                    Field::new("id", FieldType::Integer).primary(),
                    Field::new("user_id", FieldType::Integer).foreign("users.id"),
                    Field::new("title", FieldType::String),
                ],
            },
        ],
        endpoints: vec![EndpointGroup {
            name: "Posts".to_string(),
            endpoints: vec![
                Endpoint::new("GET", "/posts", "List posts"),
                Endpoint::new("POST", "/posts", "Create a post"),
            ],
        }],
        storage: StorageEngine::Postgres,
    }
}

/// `{"files": [...]}` as pretty JSON
pub fn bundle_json(files: &[(&str, &str)]) -> String {
    let files: Vec<_> = files
        .iter()
        .map(|(path, content)| json!({ "path": path, "content": content }))
        .collect();
    serde_json::to_string_pretty(&json!({ "files": files })).unwrap()
}

/// Planner reply, fenced and chatty
pub fn planner_response() -> String {
    format!("Here is the naming plan:\n\n```json\n{BLOG_PLAN}\n```\n")
}

/// Shared stage reply, clean JSON
pub fn shared_response() -> String {
    bundle_json(&[
        (
            "src/config/database.js",
            "const { Sequelize } = require('sequelize');\n\nconst sequelize = new Sequelize(process.env.DATABASE_URL);\n\nmodule.exports = sequelize;\n",
        ),
        (
            "src/app.js",
            "require('dotenv').config();\nconst express = require('express');\nconst cors = require('cors');\nconst errorHandler = require('./middleware/errorHandler');\n\nconst app = express();\napp.use(cors());\napp.use(express.json());\napp.use('/posts', require('./routes/posts'));\napp.use(errorHandler);\n\napp.listen(process.env.PORT || 3000);\n\nmodule.exports = app;\n",
        ),
        (
            "src/middleware/errorHandler.js",
            "module.exports = (err, req, res, next) => {\n  res.status(err.status || 500).json({ error: err.message });\n};\n",
        ),
    ])
}

/// Models stage reply with a trailing comma, wrapped in prose and a fence
pub fn models_response() -> String {
    let json = bundle_json(&[
        (
            "src/models/user.js",
            "const { DataTypes, Model } = require('sequelize');\nconst sequelize = require('../config/database');\n\nclass User extends Model {}\nUser.init({ email: DataTypes.STRING }, { sequelize, tableName: 'users' });\n\nmodule.exports = User;\n",
        ),
        (
            "src/models/post.js",
            "const { DataTypes, Model } = require('sequelize');\nconst sequelize = require('../config/database');\n\nclass Post extends Model {}\nPost.init({ user_id: DataTypes.INTEGER, title: DataTypes.STRING }, { sequelize, tableName: 'posts' });\n\nmodule.exports = Post;\n",
        ),
    ]);
    let json = json.replacen("\n  ]\n}", ",\n  ]\n}", 1);
    format!("Sure! Here are the models.\n```json\n{json}\n```\nLet me know if you need changes.")
}

/// Services stage reply, clean JSON
pub fn services_response() -> String {
    bundle_json(&[
        (
            "src/services/userService.js",
            "const User = require('../models/user');\n\nclass UserService {\n  findAll() { return User.findAll(); }\n  create(data) { return User.create(data); }\n}\n\nmodule.exports = new UserService();\n",
        ),
        (
            "src/services/postService.js",
            "const Post = require('../models/post');\n\nclass PostService {\n  findAll() { return Post.findAll(); }\n  create(data) { return Post.create(data); }\n}\n\nmodule.exports = new PostService();\n",
        ),
    ])
}

/// Routes stage reply with raw newlines inside the content string
pub fn routes_response() -> String {
    bundle_json(&[(
        "src/routes/posts.js",
        "const express = require('express');\nconst postService = require('../services/postService');\n\nconst router = express.Router();\n\n// GET /posts\nrouter.get('/', async (req, res) => res.json(await postService.findAll()));\n\n// POST /posts\nrouter.post('/', async (req, res) => res.status(201).json(await postService.create(req.body)));\n\nmodule.exports = router;\n",
    )])
    .replace("\\n", "\n")
}

/// Replies for every stage of a successful blog run
pub fn blog_responses() -> Vec<(StageId, String)> {
    vec![
        (StageId::Planner, planner_response()),
        (StageId::Shared, shared_response()),
        (StageId::Models, models_response()),
        (StageId::Services, services_response()),
        (StageId::Routes, routes_response()),
    ]
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Failure(String),
}

/// Model client that answers each stage from a script
///
/// Records every request so tests can assert on prompts and call order.
/// A stage without a scripted reply fails with [`ModelError::Provider`].
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: HashMap<StageId, Reply>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script answering every blog stage successfully
    pub fn blog() -> Self {
        blog_responses()
            .into_iter()
            .fold(Self::new(), |model, (stage, text)| model.with_response(stage, text))
    }

    #[must_use]
    pub fn with_response(mut self, stage: StageId, text: impl Into<String>) -> Self {
        self.replies.insert(stage, Reply::Text(text.into()));
        self
    }

    /// Make a stage's call itself fail
    #[must_use]
    pub fn with_failure(mut self, stage: StageId, message: impl Into<String>) -> Self {
        self.replies.insert(stage, Reply::Failure(message.into()));
        self
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().clone()
    }

    /// Stages that called the model, in order
    pub fn stages_called(&self) -> Vec<StageId> {
        self.requests.lock().iter().map(|r| r.stage).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Prompt sent by a stage, if it called
    pub fn prompt_for(&self, stage: StageId) -> Option<String> {
        self.requests
            .lock()
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| r.prompt.clone())
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
        self.requests.lock().push(request.clone());
        match self.replies.get(&request.stage) {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Failure(message)) => Err(ModelError::Provider(message.clone())),
            None => Err(ModelError::Provider(format!(
                "no scripted reply for stage {}",
                request.stage
            ))),
        }
    }
}
