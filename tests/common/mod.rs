#![allow(dead_code)]

use abp_terminal::loader::load_csv_reader;
use abp_terminal::table::Table;

/// Five actions over three matchdays; the last one has no target player
/// and belongs to the previous season.
pub const LIGA_CSV: &str = "\
temporada,jornada,abp_tipo,jugador_ejecutor,jugador_objetivo,equipo_atacante,equipo_defensor,tiro,gol,momento_mitad,momento_rango,x_ejecucion,y_ejecucion,xg_tiro,observaciones
2024/25,1,Córner,Pedri,Araujo,FCB,RMA,SI,NO,Primera,0-15,119.5,0.5,0.12,
2024/25,1,Falta lateral,Modric,Rudiger,RMA,FCB,NO,NO,Segunda,61-75,95,70,,segunda jugada
2024/25,2,Córner,Pedri,Kounde,FCB,ATM,SI,SI,Segunda,76-90,119.5,79.5,0.4,
2024/25,3,Córner,Griezmann,Gimenez,ATM,FCB,NO,NO,Primera,EXTRA 1,0.5,0.5,,
2023/24,3,Saque de banda,Modric,,RMA,ATM,NO,NO,Primera,16-30,60,80,,
";

/// Same actions without the optional target, coordinate and xG columns.
pub const MINIMAL_CSV: &str = "\
temporada,jornada,abp_tipo,jugador_ejecutor,equipo_atacante,equipo_defensor,tiro
2024/25,1,Córner,Pedri,FCB,RMA,SI
2024/25,1,Falta lateral,Modric,RMA,FCB,NO
2024/25,2,Córner,Pedri,FCB,ATM,SI
";

pub fn liga() -> Table {
    load_csv_reader(LIGA_CSV.as_bytes()).expect("fixture loads")
}

pub fn minimal() -> Table {
    load_csv_reader(MINIMAL_CSV.as_bytes()).expect("fixture loads")
}
