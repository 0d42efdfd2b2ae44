use crate::discretization::mesh::Grid;
use glam::DVec2;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Write data to CSV file with headers
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], data: &[Vec<f64>]) -> io::Result<()> {
    if !headers.is_empty() && !data.is_empty() && headers.len() != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                data.len()
            ),
        ));
    }

    let mut file = File::create(path)?;

    writeln!(file, "{}", headers.join(","))?;

    let n_rows = data.iter().map(|col| col.len()).max().unwrap_or(0);

    for i in 0..n_rows {
        let row: Vec<String> = data
            .iter()
            .map(|col| {
                if i < col.len() {
                    format!("{:.15e}", col[i])
                } else {
                    String::new()
                }
            })
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }

    Ok(())
}

/// Write x-y data pairs
pub fn write_xy<P: AsRef<Path>>(
    path: P,
    x_header: &str,
    y_header: &str,
    x_data: &[f64],
    y_data: &[f64],
) -> io::Result<()> {
    if x_data.len() != y_data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "X and Y data lengths don't match ({} vs {})",
                x_data.len(),
                y_data.len()
            ),
        ));
    }
    write_csv(
        path,
        &[x_header, y_header],
        &[x_data.to_vec(), y_data.to_vec()],
    )
}

/// Cell centres with pressure and velocity, one row per cell.
pub fn write_field<P: AsRef<Path>, G: Grid>(path: P, grid: &G) -> io::Result<()> {
    let ids = grid.cell_ids();
    let mut columns = vec![Vec::with_capacity(ids.len()); 5];
    for id in ids {
        let centre = grid.coordinates(id);
        let volume = grid.volume(id);
        columns[0].push(centre.x);
        columns[1].push(centre.y);
        columns[2].push(volume.pressure());
        columns[3].push(volume.velocity().x);
        columns[4].push(volume.velocity().y);
    }
    write_csv(path, &["x", "y", "pressure", "vx", "vy"], &columns)
}

pub fn write_streamline<P: AsRef<Path>>(path: P, points: &[DVec2]) -> io::Result<()> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    write_xy(path, "x", "y", &xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discretization::generator::RegularGrid;
    use std::fs;

    #[test]
    fn csv_has_header_row() {
        let path = "test_output.csv";
        let headers = &["x", "y", "z"];
        let data = vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ];

        write_csv(path, headers, &data).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("x,y,z"));

        fs::remove_file(path).ok();
    }

    #[test]
    fn field_has_row_per_cell() {
        let path = "test_field_output.csv";
        let mut grid = RegularGrid::new(1.0, 3);
        grid.volume_mut(crate::discretization::mesh::CellId(4))
            .set_pressure(2.5);

        write_field(path, &grid).unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "x,y,pressure,vx,vy");
        assert_eq!(lines.len(), 10);
        assert!(lines[5].contains("2.500000000000000e0"));

        fs::remove_file(path).ok();
    }

    #[test]
    fn mismatched_xy_is_rejected() {
        assert!(write_xy("never_written.csv", "x", "y", &[1.0], &[]).is_err());
    }
}
