mod handlers;
mod types;

pub use handlers::{
    create_reading, delete_reading, get_reading, list_readings, list_sensor_readings,
    update_reading,
};
pub use types::{ReadingDetailResponse, ReadingResponse, SensorSummary};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{
    __path_create_reading, __path_delete_reading, __path_get_reading, __path_list_readings,
    __path_list_sensor_readings, __path_update_reading,
};
