pub mod model_based;
