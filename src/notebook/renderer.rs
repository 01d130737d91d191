//! Notebook rendering: session configuration in, executable document out.

use crate::models::session::ModelConfig;
use crate::{AppError, Result};

use super::document::{py_bool, py_str, Notebook, NotebookCell};

/// Everything a rendered notebook needs to know about its session.
#[derive(Debug, Clone)]
pub struct NotebookSpec {
    /// Session the notebook reports back to.
    pub session_id: String,
    /// Dashboard base URL for the status callbacks.
    pub dashboard_url: String,
    /// Dataset the notebook trains against.
    pub dataset_id: String,
    /// Training hyperparameters (clamped during rendering).
    pub config: ModelConfig,
    /// Roboflow workspace API key embedded for the dataset download.
    pub roboflow_api_key: String,
    /// Roboflow workspace slug.
    pub roboflow_workspace: String,
    /// Roboflow project identifier.
    pub roboflow_project: String,
    /// Gemini API key embedded for the nutrition analysis.
    pub gemini_api_key: String,
    /// Gemini model identifier.
    pub gemini_model: String,
}

/// Render the training notebook for `spec`.
///
/// Pure: identical specs produce identical documents. No wall-clock fields
/// are embedded; all timestamps in the notebook come from the external
/// environment at execution time.
#[must_use]
pub fn render(spec: &NotebookSpec) -> Notebook {
    let config = spec.config.clone().clamped();
    let cells = vec![
        header_cell(spec, &config),
        install_cell(),
        imports_cell(),
        config_cell(spec, &config),
        dataset_cell(),
        model_init_cell(),
        training_cell(),
        validation_cell(),
        nutrition_cell(),
        export_cell(),
        summary_cell(),
    ];
    Notebook::from_cells(cells)
}

/// Render and serialize in one step.
///
/// # Errors
///
/// Returns `AppError::Template` if the document fails to serialize.
pub fn render_document(spec: &NotebookSpec) -> Result<String> {
    render(spec)
        .to_json()
        .map_err(|err| AppError::Template(format!("notebook serialization failed: {err}")))
}

fn header_cell(spec: &NotebookSpec, config: &ModelConfig) -> NotebookCell {
    NotebookCell::markdown(
        "nutriscan_header",
        &[
            "# NutriScan MY — Malaysian Food Detection Training".to_owned(),
            String::new(),
            "## Training configuration".to_owned(),
            format!("- **Session**: {}", spec.session_id),
            format!("- **Model**: {}", config.model_type),
            format!("- **Epochs**: {}", config.epochs),
            format!("- **Batch size**: {}", config.batch_size),
            format!("- **Learning rate**: {}", config.learning_rate),
            format!("- **Image size**: {}", config.img_size),
            String::new(),
            "---".to_owned(),
            String::new(),
            "Pre-configured by the dashboard. Run all cells to start training.".to_owned(),
        ],
    )
}

fn install_cell() -> NotebookCell {
    NotebookCell::code(
        "install_dependencies",
        &[
            "# Install third-party packages".to_owned(),
            "!pip install ultralytics roboflow torch torchvision matplotlib pandas numpy requests --quiet".to_owned(),
            "print(\"dependencies installed\")".to_owned(),
        ],
    )
}

fn imports_cell() -> NotebookCell {
    NotebookCell::code(
        "import_libraries",
        &[
            "import os".to_owned(),
            "import json".to_owned(),
            "import requests".to_owned(),
            "from datetime import datetime".to_owned(),
            String::new(),
            "from ultralytics import YOLO".to_owned(),
            "from roboflow import Roboflow".to_owned(),
            String::new(),
            "print(\"libraries imported\")".to_owned(),
        ],
    )
}

fn config_cell(spec: &NotebookSpec, config: &ModelConfig) -> NotebookCell {
    NotebookCell::code(
        "config_parameters",
        &[
            "# Session parameters injected by the dashboard".to_owned(),
            format!("SESSION_ID = {}", py_str(&spec.session_id)),
            format!("DASHBOARD_URL = {}", py_str(&spec.dashboard_url)),
            format!("DATASET_ID = {}", py_str(&spec.dataset_id)),
            String::new(),
            format!("ROBOFLOW_API_KEY = {}", py_str(&spec.roboflow_api_key)),
            format!("ROBOFLOW_WORKSPACE = {}", py_str(&spec.roboflow_workspace)),
            format!("ROBOFLOW_PROJECT = {}", py_str(&spec.roboflow_project)),
            format!("GEMINI_API_KEY = {}", py_str(&spec.gemini_api_key)),
            format!("GEMINI_MODEL = {}", py_str(&spec.gemini_model)),
            String::new(),
            "TRAINING_CONFIG = {".to_owned(),
            format!("    \"model_type\": {},", py_str(&config.model_type)),
            format!("    \"epochs\": {},", config.epochs),
            format!("    \"batch_size\": {},", config.batch_size),
            format!("    \"learning_rate\": {},", config.learning_rate),
            format!("    \"img_size\": {},", config.img_size),
            format!("    \"patience\": {},", config.patience),
            format!("    \"save_period\": {},", config.save_period),
            format!("    \"augment\": {},", py_bool(config.augment)),
            format!("    \"optimizer\": {},", py_str(&config.optimizer)),
            format!("    \"loss_function\": {}", py_str(&config.loss_function)),
            "}".to_owned(),
            String::new(),
            "OUTPUT_DIR = f\"/content/nutriscan_training_{SESSION_ID}\"".to_owned(),
            "os.makedirs(OUTPUT_DIR, exist_ok=True)".to_owned(),
            String::new(),
            "def report_status(status, **fields):".to_owned(),
            "    \"\"\"Best-effort status callback to the dashboard.\"\"\"".to_owned(),
            "    try:".to_owned(),
            "        requests.post(".to_owned(),
            "            f\"{DASHBOARD_URL}/api/training/colab/status/{SESSION_ID}\",".to_owned(),
            "            json={\"status\": status, \"timestamp\": datetime.utcnow().isoformat() + \"Z\", **fields},".to_owned(),
            "            timeout=10,".to_owned(),
            "        )".to_owned(),
            "    except Exception:".to_owned(),
            "        print(f\"dashboard unreachable, continuing ({status})\")".to_owned(),
            String::new(),
            "report_status(\"started\", config=TRAINING_CONFIG)".to_owned(),
            "print(f\"session {SESSION_ID} configured\")".to_owned(),
        ],
    )
}

fn dataset_cell() -> NotebookCell {
    NotebookCell::code(
        "download_dataset",
        &[
            "# Pull the dataset from Roboflow".to_owned(),
            "rf = Roboflow(api_key=ROBOFLOW_API_KEY)".to_owned(),
            "project = rf.workspace(ROBOFLOW_WORKSPACE).project(ROBOFLOW_PROJECT)".to_owned(),
            "dataset = project.version(1).download(\"yolov8\")".to_owned(),
            String::new(),
            "def count_images(split):".to_owned(),
            "    path = os.path.join(dataset.location, split)".to_owned(),
            "    if not os.path.exists(path):".to_owned(),
            "        return 0".to_owned(),
            "    return len([f for f in os.listdir(path) if f.endswith((\".jpg\", \".jpeg\", \".png\"))])".to_owned(),
            String::new(),
            "dataset_stats = {".to_owned(),
            "    \"train_images\": count_images(\"train\"),".to_owned(),
            "    \"val_images\": count_images(\"valid\"),".to_owned(),
            "    \"test_images\": count_images(\"test\"),".to_owned(),
            "}".to_owned(),
            "dataset_stats[\"total_images\"] = sum(dataset_stats.values())".to_owned(),
            String::new(),
            "report_status(\"dataset_ready\", dataset_stats=dataset_stats)".to_owned(),
            "print(f\"dataset ready: {dataset_stats}\")".to_owned(),
        ],
    )
}

fn model_init_cell() -> NotebookCell {
    NotebookCell::code(
        "initialize_model",
        &[
            "# Load base weights for the configured variant".to_owned(),
            "model_type = TRAINING_CONFIG[\"model_type\"]".to_owned(),
            "model = YOLO(f\"{model_type}.pt\")".to_owned(),
            String::new(),
            "report_status(\"model_ready\", model_type=model_type)".to_owned(),
            "print(f\"model initialized: {model_type}\")".to_owned(),
        ],
    )
}

fn training_cell() -> NotebookCell {
    NotebookCell::code(
        "start_training",
        &[
            "train_args = {".to_owned(),
            "    \"data\": os.path.join(dataset.location, \"data.yaml\"),".to_owned(),
            "    \"epochs\": TRAINING_CONFIG[\"epochs\"],".to_owned(),
            "    \"batch\": TRAINING_CONFIG[\"batch_size\"],".to_owned(),
            "    \"imgsz\": TRAINING_CONFIG[\"img_size\"],".to_owned(),
            "    \"lr0\": TRAINING_CONFIG[\"learning_rate\"],".to_owned(),
            "    \"patience\": TRAINING_CONFIG[\"patience\"],".to_owned(),
            "    \"save_period\": TRAINING_CONFIG[\"save_period\"],".to_owned(),
            "    \"augment\": TRAINING_CONFIG[\"augment\"],".to_owned(),
            "    \"project\": OUTPUT_DIR,".to_owned(),
            "    \"name\": f\"nutriscan_{model_type}\",".to_owned(),
            "    \"exist_ok\": True,".to_owned(),
            "    \"device\": 0,".to_owned(),
            "}".to_owned(),
            String::new(),
            "report_status(\"training_started\", config=TRAINING_CONFIG)".to_owned(),
            "results = model.train(**train_args)".to_owned(),
            "print(\"training finished\")".to_owned(),
        ],
    )
}

fn validation_cell() -> NotebookCell {
    NotebookCell::code(
        "model_validation",
        &[
            "best_model_path = os.path.join(results.save_dir, \"weights\", \"best.pt\")".to_owned(),
            "best_model = YOLO(best_model_path)".to_owned(),
            "val_results = best_model.val(data=os.path.join(dataset.location, \"data.yaml\"))".to_owned(),
            String::new(),
            "metrics = {".to_owned(),
            "    \"accuracy\": float(getattr(val_results.box, \"map\", 0.0)),".to_owned(),
            "    \"map50\": float(getattr(val_results.box, \"map50\", 0.0)),".to_owned(),
            "    \"precision\": float(getattr(val_results.box, \"mp\", 0.0)),".to_owned(),
            "    \"recall\": float(getattr(val_results.box, \"mr\", 0.0)),".to_owned(),
            "}".to_owned(),
            String::new(),
            "report_status(\"validation_completed\", metrics=metrics)".to_owned(),
            "print(f\"validation metrics: {metrics}\")".to_owned(),
        ],
    )
}

fn nutrition_cell() -> NotebookCell {
    NotebookCell::code(
        "nutrition_analysis",
        &[
            "# Nutrition analysis for the detected classes via Gemini".to_owned(),
            "GEMINI_URL = (".to_owned(),
            "    \"https://generativelanguage.googleapis.com/v1beta/models/\"".to_owned(),
            "    f\"{GEMINI_MODEL}:generateContent\"".to_owned(),
            ")".to_owned(),
            String::new(),
            "def analyze_food(food_name):".to_owned(),
            "    prompt = (".to_owned(),
            "        f\"Provide a nutritional analysis for the Malaysian food {food_name}: \"".to_owned(),
            "        \"calories, protein, carbohydrates and fat per 100g, plus health notes.\"".to_owned(),
            "    )".to_owned(),
            "    body = {\"contents\": [{\"parts\": [{\"text\": prompt}]}]}".to_owned(),
            "    try:".to_owned(),
            "        resp = requests.post(GEMINI_URL, params={\"key\": GEMINI_API_KEY}, json=body, timeout=30)".to_owned(),
            "        return resp.json()[\"candidates\"][0][\"content\"][\"parts\"][0][\"text\"]".to_owned(),
            "    except Exception as exc:".to_owned(),
            "        return f\"analysis unavailable: {exc}\"".to_owned(),
            String::new(),
            "sample_foods = [\"Nasi Lemak\", \"Roti Canai\", \"Char Kway Teow\", \"Bak Kut Teh\"]".to_owned(),
            "nutrition_results = {food: analyze_food(food) for food in sample_foods}".to_owned(),
            String::new(),
            "report_status(\"nutrition_analysis_completed\", nutrition_results=nutrition_results)".to_owned(),
            "print(\"nutrition analysis done\")".to_owned(),
        ],
    )
}

fn export_cell() -> NotebookCell {
    NotebookCell::code(
        "export_models",
        &[
            "exported_models = {}".to_owned(),
            "for fmt in (\"onnx\", \"torchscript\"):".to_owned(),
            "    try:".to_owned(),
            "        exported_models[fmt] = str(best_model.export(format=fmt))".to_owned(),
            "    except Exception as exc:".to_owned(),
            "        print(f\"export {fmt} failed: {exc}\")".to_owned(),
            String::new(),
            "report_status(\"models_exported\", exported_models=exported_models)".to_owned(),
            "print(f\"exported: {list(exported_models)}\")".to_owned(),
        ],
    )
}

fn summary_cell() -> NotebookCell {
    NotebookCell::code(
        "training_summary",
        &[
            "summary = {".to_owned(),
            "    \"project_info\": {".to_owned(),
            "        \"name\": \"NutriScan MY - Malaysian Food Detection\",".to_owned(),
            "        \"model_type\": model_type,".to_owned(),
            "        \"session_id\": SESSION_ID,".to_owned(),
            "        \"dataset_id\": DATASET_ID,".to_owned(),
            "        \"training_date\": datetime.utcnow().isoformat() + \"Z\",".to_owned(),
            "    },".to_owned(),
            "    \"training_config\": TRAINING_CONFIG,".to_owned(),
            "    \"dataset_info\": dataset_stats,".to_owned(),
            "    \"model_results\": {".to_owned(),
            "        \"best_model_path\": best_model_path,".to_owned(),
            "        \"exported_models\": exported_models,".to_owned(),
            "        \"metrics\": metrics,".to_owned(),
            "    },".to_owned(),
            "    \"nutrition_analysis\": nutrition_results,".to_owned(),
            "}".to_owned(),
            String::new(),
            "with open(os.path.join(OUTPUT_DIR, \"training_summary.json\"), \"w\") as f:".to_owned(),
            "    json.dump(summary, f, indent=2)".to_owned(),
            String::new(),
            "try:".to_owned(),
            "    requests.post(".to_owned(),
            "        f\"{DASHBOARD_URL}/api/training/colab/result\",".to_owned(),
            "        json={".to_owned(),
            "            \"session_id\": SESSION_ID,".to_owned(),
            "            \"status\": \"completed\",".to_owned(),
            "            \"summary\": summary,".to_owned(),
            "            \"timestamp\": datetime.utcnow().isoformat() + \"Z\",".to_owned(),
            "        },".to_owned(),
            "        timeout=30,".to_owned(),
            "    )".to_owned(),
            "    print(\"results synced to dashboard\")".to_owned(),
            "except Exception:".to_owned(),
            "    print(\"dashboard unreachable, summary kept locally\")".to_owned(),
        ],
    )
}
