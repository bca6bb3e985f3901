//! API documentation
//!
//! Static OpenAPI document describing the file routes.

use axum::{response::IntoResponse, Json};
use serde_json::{json, Value};

/// Build the OpenAPI 3 description of the API
pub fn openapi() -> Value {
    let pin_param = json!({
        "name": "pin",
        "in": "path",
        "required": true,
        "description": "PIN (6-8 digits)",
        "schema": { "type": "string" }
    });
    let error = json!({
        "type": "object",
        "properties": { "error": { "type": "string" } }
    });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "PinDrop File Serving API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Upload and download files grouped under a PIN."
        },
        "paths": {
            "/api/files/{pin}": {
                "get": {
                    "summary": "List files",
                    "description": "Get existing files for a PIN",
                    "tags": ["files"],
                    "parameters": [pin_param],
                    "responses": {
                        "200": {
                            "description": "Files stored under the PIN",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "files": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "name": { "type": "string" },
                                            "size": { "type": "integer", "format": "int64" }
                                        }
                                    }
                                }}
                            }}}
                        },
                        "500": { "description": "Storage failure", "content": { "application/json": { "schema": error } } }
                    }
                },
                "post": {
                    "summary": "Upload a file",
                    "description": "Upload a file to the storage for a specific PIN",
                    "tags": ["files"],
                    "parameters": [pin_param],
                    "requestBody": {
                        "required": true,
                        "content": { "multipart/form-data": { "schema": {
                            "type": "object",
                            "properties": { "file": { "type": "string", "format": "binary" } },
                            "required": ["file"]
                        }}}
                    },
                    "responses": {
                        "200": {
                            "description": "Upload stored",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "message": { "type": "string" } }
                            }}}
                        },
                        "400": { "description": "Missing file field", "content": { "application/json": { "schema": error } } },
                        "500": { "description": "Storage failure", "content": { "application/json": { "schema": error } } }
                    }
                }
            },
            "/api/files/{pin}/{filename}": {
                "get": {
                    "summary": "Download a file",
                    "description": "Download a file by name for a specific PIN",
                    "tags": ["files"],
                    "parameters": [
                        pin_param,
                        {
                            "name": "filename",
                            "in": "path",
                            "required": true,
                            "description": "Filename",
                            "schema": { "type": "string" }
                        }
                    ],
                    "responses": {
                        "200": {
                            "description": "File contents",
                            "content": { "application/octet-stream": { "schema": { "type": "string", "format": "binary" } } }
                        },
                        "404": { "description": "File not found", "content": { "application/json": { "schema": error } } }
                    }
                }
            }
        }
    })
}

pub(crate) async fn handle_docs() -> impl IntoResponse {
    Json(openapi())
}
